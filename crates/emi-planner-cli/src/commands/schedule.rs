use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use emi_planner_core::amortization::{self, tenure_months_from_years, LoanDefinition};

use crate::input;

/// Loan terms shared by the installment, schedule and yearly commands
#[derive(Args)]
pub struct LoanTermsArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Amount borrowed
    #[arg(long)]
    pub principal: Option<Decimal>,

    /// Annual interest rate in percent (e.g. 8.5 for 8.5%)
    #[arg(long)]
    pub rate: Option<Decimal>,

    /// Tenure in months
    #[arg(long, conflicts_with = "tenure_years")]
    pub tenure_months: Option<u32>,

    /// Tenure in years; fractions round to the nearest month
    #[arg(long)]
    pub tenure_years: Option<Decimal>,
}

fn resolve_definition(args: LoanTermsArgs) -> Result<LoanDefinition, Box<dyn std::error::Error>> {
    let definition: LoanDefinition = if let Some(data) = input::load(args.input.as_deref())? {
        data
    } else {
        let principal = args
            .principal
            .ok_or("--principal is required (or provide --input)")?;
        let tenure_months = match (args.tenure_months, args.tenure_years) {
            (Some(months), _) => months,
            (None, Some(years)) => tenure_months_from_years(years)?,
            (None, None) => {
                return Err("--tenure-months or --tenure-years is required (or provide --input)".into())
            }
        };
        LoanDefinition {
            principal,
            annual_rate_percent: args.rate.unwrap_or(Decimal::ZERO),
            tenure_months,
        }
    };
    definition.validate()?;
    Ok(definition)
}

pub fn run_installment(args: LoanTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let definition = resolve_definition(args)?;
    let result = amortization::report_installment(&definition)?;
    Ok(serde_json::to_value(result)?)
}

pub fn run_schedule(args: LoanTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let definition = resolve_definition(args)?;
    let result = amortization::report_schedule(&definition)?;
    let mut value = serde_json::to_value(result)?;
    strip_field(&mut value, "yearly_summary");
    Ok(value)
}

pub fn run_yearly(args: LoanTermsArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let definition = resolve_definition(args)?;
    let result = amortization::report_schedule(&definition)?;
    let mut value = serde_json::to_value(result)?;
    strip_field(&mut value, "periods");
    Ok(value)
}

/// Drop a field from the `result` object so each command prints one table.
fn strip_field(value: &mut Value, field: &str) {
    if let Some(Value::Object(result)) = value.get_mut("result") {
        result.remove(field);
    }
}
