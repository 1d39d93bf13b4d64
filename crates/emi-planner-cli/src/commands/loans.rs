use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use serde_json::{json, Value};
use uuid::Uuid;

use emi_planner_core::amortization::tenure_months_from_years;
use emi_planner_core::tracking::loan::{Loan, LoanType, NewLoan};
use emi_planner_core::tracking::reminder::installments_paid;
use emi_planner_core::tracking::store::LoanStore;
use emi_planner_core::types::round_to_unit;

use crate::input;

#[derive(Subcommand)]
pub enum LoanCommand {
    /// Save a new loan and generate its payment reminders
    Add(AddLoanArgs),
    /// List saved loans
    List(ListLoansArgs),
    /// Show a saved loan with its repayment position
    Show(LoanIdArgs),
    /// Mark a loan as closed (moves it to history)
    Close(LoanIdArgs),
    /// Move a closed loan back to the active list
    Restore(LoanIdArgs),
    /// Delete a loan with its reminders and notes
    Delete(LoanIdArgs),
}

/// Arguments for saving a loan
#[derive(Args)]
pub struct AddLoanArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan id (generated when omitted)
    #[arg(long)]
    pub id: Option<String>,

    /// Display name, e.g. "HDFC Home Loan"
    #[arg(long)]
    pub name: Option<String>,

    /// personal, home, vehicle or education
    #[arg(long, default_value = "personal")]
    pub loan_type: LoanType,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent
    #[arg(long, default_value = "0")]
    pub rate: Decimal,

    /// Tenure in months
    #[arg(long, conflicts_with = "tenure_years")]
    pub tenure_months: Option<u32>,

    /// Tenure in years; fractions round to the nearest month
    #[arg(long)]
    pub tenure_years: Option<Decimal>,

    /// Start date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub start_date: Option<NaiveDate>,
}

#[derive(Args)]
pub struct ListLoansArgs {
    /// Include closed loans
    #[arg(long, conflicts_with = "closed")]
    pub all: bool,

    /// Only closed loans
    #[arg(long)]
    pub closed: bool,
}

#[derive(Args)]
pub struct LoanIdArgs {
    /// Loan id
    pub id: String,
}

pub fn run_loan(
    command: LoanCommand,
    store: &mut dyn LoanStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    match command {
        LoanCommand::Add(args) => run_add(args, store),
        LoanCommand::List(args) => {
            let loans: Vec<&Loan> = if args.all {
                store.loans().iter().collect()
            } else if args.closed {
                store.closed_loans()
            } else {
                store.active_loans()
            };
            Ok(serde_json::to_value(loans)?)
        }
        LoanCommand::Show(args) => run_show(&args.id, store),
        LoanCommand::Close(args) => {
            store.close_loan(&args.id, Utc::now())?;
            Ok(serde_json::to_value(store.loan(&args.id)?)?)
        }
        LoanCommand::Restore(args) => {
            store.restore_loan(&args.id)?;
            Ok(serde_json::to_value(store.loan(&args.id)?)?)
        }
        LoanCommand::Delete(args) => {
            let loan = store.delete_loan(&args.id)?;
            Ok(json!({ "deleted": loan.id, "name": loan.name }))
        }
    }
}

fn run_add(args: AddLoanArgs, store: &mut dyn LoanStore) -> Result<Value, Box<dyn std::error::Error>> {
    let new_loan: NewLoan = if let Some(data) = input::load(args.input.as_deref())? {
        data
    } else {
        let tenure_months = match (args.tenure_months, args.tenure_years) {
            (Some(months), _) => months,
            (None, Some(years)) => tenure_months_from_years(years)?,
            (None, None) => return Err("--tenure-months or --tenure-years is required".into()),
        };
        NewLoan {
            name: args.name.ok_or("--name is required (or provide --input)")?,
            loan_type: args.loan_type,
            principal: args
                .principal
                .ok_or("--principal is required (or provide --input)")?,
            annual_rate_percent: args.rate,
            tenure_months,
            start_date: args.start_date.unwrap_or_else(|| Local::now().date_naive()),
        }
    };

    let id = args.id.unwrap_or_else(|| Uuid::new_v4().to_string());
    let loan = Loan::create(id, new_loan)?;
    let id = loan.id.clone();
    store.add_loan(loan)?;
    Ok(serde_json::to_value(store.loan(&id)?)?)
}

fn run_show(id: &str, store: &mut dyn LoanStore) -> Result<Value, Box<dyn std::error::Error>> {
    let loan = store.loan(id)?;
    let plan = loan.schedule()?;
    let paid = installments_paid(store.reminders(), id);
    let notes = store.notes_for(id).len();

    Ok(json!({
        "result": {
            "id": loan.id,
            "name": loan.name,
            "loan_type": loan.loan_type,
            "status": loan.status,
            "principal": loan.principal,
            "annual_rate_percent": loan.annual_rate_percent,
            "tenure_months": loan.tenure_months,
            "start_date": loan.start_date,
            "maturity_date": loan.maturity_date()?,
            "emi": loan.emi,
            "total_interest": plan.report().total_interest,
            "installments_paid": paid,
            "outstanding_balance": round_to_unit(plan.balance_after(paid)),
            "notes": notes,
            "yearly_summary": plan.to_report().yearly_summary,
        }
    }))
}
