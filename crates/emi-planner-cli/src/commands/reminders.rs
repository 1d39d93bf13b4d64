use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Subcommand};
use serde_json::Value;
use uuid::Uuid;

use emi_planner_core::tracking::reminder::{
    overdue_payments, task_reminder, upcoming_payments, Reminder, DEFAULT_UPCOMING_WINDOW_DAYS,
};
use emi_planner_core::tracking::store::LoanStore;

#[derive(Subcommand)]
pub enum ReminderCommand {
    /// List reminders, optionally for one loan
    List(ListRemindersArgs),
    /// Mark a reminder as paid now
    Pay(ReminderIdArgs),
    /// Clear the paid flag on a reminder
    Unpay(ReminderIdArgs),
    /// Unpaid EMIs falling due within the next few days
    Upcoming(UpcomingArgs),
    /// Unpaid EMIs past their due date
    Overdue(TodayArgs),
    /// Attach a to-do reminder to a loan
    AddTask(AddTaskArgs),
}

#[derive(Args)]
pub struct ListRemindersArgs {
    /// Only reminders for this loan
    #[arg(long)]
    pub loan: Option<String>,

    /// Hide paid reminders
    #[arg(long)]
    pub pending: bool,
}

#[derive(Args)]
pub struct ReminderIdArgs {
    /// Reminder id, e.g. "<loan-id>-emi-3"
    pub id: String,
}

#[derive(Args)]
pub struct TodayArgs {
    /// Reference date (YYYY-MM-DD); defaults to today
    #[arg(long)]
    pub today: Option<NaiveDate>,
}

#[derive(Args)]
pub struct UpcomingArgs {
    /// Look-ahead window in days
    #[arg(long, default_value_t = DEFAULT_UPCOMING_WINDOW_DAYS)]
    pub days: i64,

    #[command(flatten)]
    pub today: TodayArgs,
}

#[derive(Args)]
pub struct AddTaskArgs {
    /// Loan the task belongs to
    #[arg(long)]
    pub loan: String,

    /// What needs doing
    #[arg(long)]
    pub title: String,

    /// Due date (YYYY-MM-DD)
    #[arg(long)]
    pub due: NaiveDate,
}

impl TodayArgs {
    fn resolve(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }
}

pub fn run_reminder(
    command: ReminderCommand,
    store: &mut dyn LoanStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    match command {
        ReminderCommand::List(args) => {
            let reminders: Vec<&Reminder> = match args.loan {
                Some(ref loan_id) => {
                    store.loan(loan_id)?;
                    store.reminders_for(loan_id)
                }
                None => store.reminders().iter().collect(),
            };
            let reminders: Vec<&Reminder> = reminders
                .into_iter()
                .filter(|r| !args.pending || !r.is_paid)
                .collect();
            Ok(serde_json::to_value(reminders)?)
        }
        ReminderCommand::Pay(args) => {
            store.set_reminder_paid(&args.id, Some(Utc::now()))?;
            find(store, &args.id)
        }
        ReminderCommand::Unpay(args) => {
            store.set_reminder_paid(&args.id, None)?;
            find(store, &args.id)
        }
        ReminderCommand::Upcoming(args) => {
            let due = upcoming_payments(store.reminders(), args.today.resolve(), args.days);
            Ok(serde_json::to_value(due)?)
        }
        ReminderCommand::Overdue(args) => {
            let due = overdue_payments(store.reminders(), args.resolve());
            Ok(serde_json::to_value(due)?)
        }
        ReminderCommand::AddTask(args) => {
            let id = format!("{}-task-{}", args.loan, Uuid::new_v4().simple());
            let reminder = task_reminder(id, args.loan, args.title, args.due)?;
            let value = serde_json::to_value(&reminder)?;
            store.add_reminder(reminder)?;
            Ok(value)
        }
    }
}

fn find(store: &dyn LoanStore, id: &str) -> Result<Value, Box<dyn std::error::Error>> {
    let reminder = store
        .reminders()
        .iter()
        .find(|r| r.id == id)
        .ok_or_else(|| format!("reminder '{id}' not found"))?;
    Ok(serde_json::to_value(reminder)?)
}
