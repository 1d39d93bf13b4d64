//! Portfolio view across saved loans.
//!
//! Outstanding balances come from the amortization schedule of each loan,
//! indexed by the number of installments marked paid.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::tracking::loan::{Loan, LoanType};
use crate::tracking::reminder::{
    installments_paid, overdue_payments, upcoming_payments, Reminder,
    DEFAULT_UPCOMING_WINDOW_DAYS,
};
use crate::tracking::store::LoanStore;
use crate::types::*;
use crate::EmiResult;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanProgress {
    pub loan_id: String,
    pub name: String,
    pub loan_type: LoanType,
    pub emi: Money,
    pub installments_paid: u32,
    pub installments_total: u32,
    /// Share of installments paid, in percent (2 dp).
    pub progress_pct: Decimal,
    pub outstanding_balance: Money,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_due_date: Option<NaiveDate>,
    /// Most recent `paid_at` across the loan's installments.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_paid_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NextPayment {
    pub reminder_id: String,
    pub loan_id: String,
    pub title: String,
    pub due_date: NaiveDate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    pub active_loans: usize,
    pub closed_loans: usize,
    pub total_principal: Money,
    pub total_monthly_emi: Money,
    pub total_outstanding: Money,
    pub payments_paid: usize,
    pub payments_pending: usize,
    pub payments_overdue: usize,
    pub payments_upcoming: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_payment: Option<NextPayment>,
    pub loans: Vec<LoanProgress>,
}

/// Summarize active loans and their payment reminders as of `today`.
pub fn summarize(
    loans: &[Loan],
    reminders: &[Reminder],
    today: NaiveDate,
) -> EmiResult<DashboardSummary> {
    let active: Vec<&Loan> = loans.iter().filter(|l| l.is_active()).collect();
    let active_reminders: Vec<Reminder> = reminders
        .iter()
        .filter(|r| r.is_payment() && active.iter().any(|l| l.id == r.loan_id))
        .cloned()
        .collect();

    let mut progress = Vec::with_capacity(active.len());
    for loan in &active {
        let paid = installments_paid(&active_reminders, &loan.id);
        let plan = loan.schedule()?;
        let next_due_date = active_reminders
            .iter()
            .filter(|r| r.loan_id == loan.id && !r.is_paid)
            .map(|r| r.due_date)
            .min();
        let last_paid_at = active_reminders
            .iter()
            .filter(|r| r.loan_id == loan.id && r.is_paid)
            .filter_map(|r| r.paid_at)
            .max();

        progress.push(LoanProgress {
            loan_id: loan.id.clone(),
            name: loan.name.clone(),
            loan_type: loan.loan_type,
            emi: loan.emi,
            installments_paid: paid,
            installments_total: loan.tenure_months,
            progress_pct: (Decimal::from(paid) / Decimal::from(loan.tenure_months) * dec!(100))
                .round_dp(2),
            outstanding_balance: round_to_unit(plan.balance_after(paid)),
            next_due_date,
            last_paid_at,
        });
    }

    let payments_paid = active_reminders.iter().filter(|r| r.is_paid).count();
    let upcoming = upcoming_payments(&active_reminders, today, DEFAULT_UPCOMING_WINDOW_DAYS);
    let next_payment = active_reminders
        .iter()
        .filter(|r| !r.is_paid && r.due_date >= today)
        .min_by_key(|r| r.due_date)
        .map(|r| NextPayment {
            reminder_id: r.id.clone(),
            loan_id: r.loan_id.clone(),
            title: r.title.clone(),
            due_date: r.due_date,
        });

    Ok(DashboardSummary {
        active_loans: active.len(),
        closed_loans: loans.len() - active.len(),
        total_principal: active.iter().map(|l| l.principal).sum(),
        total_monthly_emi: active.iter().map(|l| l.emi).sum(),
        total_outstanding: progress.iter().map(|p| p.outstanding_balance).sum(),
        payments_paid,
        payments_pending: active_reminders.len() - payments_paid,
        payments_overdue: overdue_payments(&active_reminders, today).len(),
        payments_upcoming: upcoming.len(),
        next_payment,
        loans: progress,
    })
}

pub fn summarize_store<S: LoanStore + ?Sized>(
    store: &S,
    today: NaiveDate,
) -> EmiResult<DashboardSummary> {
    summarize(store.loans(), store.reminders(), today)
}
