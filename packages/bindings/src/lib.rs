use chrono::NaiveDate;
use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Deserialize;

use emi_planner_core::amortization::{self, LoanDefinition};
use emi_planner_core::tracking::dashboard;
use emi_planner_core::tracking::loan::Loan;
use emi_planner_core::tracking::reminder::{self, Reminder};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Amortization
// ---------------------------------------------------------------------------

#[napi]
pub fn compute_installment(input_json: String) -> NapiResult<String> {
    let input: LoanDefinition = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::report_installment(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn build_schedule(input_json: String) -> NapiResult<String> {
    let input: LoanDefinition = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = amortization::report_schedule(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Tracking
// ---------------------------------------------------------------------------

#[napi]
pub fn generate_payment_reminders(loan_json: String) -> NapiResult<String> {
    let loan: Loan = serde_json::from_str(&loan_json).map_err(to_napi_error)?;
    let reminders = reminder::generate_payment_reminders(&loan).map_err(to_napi_error)?;
    serde_json::to_string(&reminders).map_err(to_napi_error)
}

#[derive(Deserialize)]
struct DashboardInput {
    loans: Vec<Loan>,
    reminders: Vec<Reminder>,
    today: NaiveDate,
}

#[napi]
pub fn summarize_dashboard(input_json: String) -> NapiResult<String> {
    let input: DashboardInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = dashboard::summarize(&input.loans, &input.reminders, input.today)
        .map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}
