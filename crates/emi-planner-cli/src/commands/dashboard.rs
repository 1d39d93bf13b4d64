use chrono::{Local, NaiveDate};
use clap::Args;
use serde_json::{json, Value};

use emi_planner_core::tracking::dashboard::summarize_store;
use emi_planner_core::tracking::demo::seed_demo_data;
use emi_planner_core::tracking::store::LoanStore;

#[derive(Args)]
pub struct DashboardArgs {
    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

pub fn run_dashboard(
    args: DashboardArgs,
    store: &mut dyn LoanStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    let summary = summarize_store(&*store, today)?;
    Ok(json!({ "result": summary }))
}

pub fn run_demo(
    args: DashboardArgs,
    store: &mut dyn LoanStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    let now = Local::now();
    let today = args.today.unwrap_or_else(|| now.date_naive());
    let suffix = now.timestamp_millis().to_string();
    let ids = seed_demo_data(store, today, &suffix)?;
    Ok(json!({ "result": { "loaded": ids } }))
}
