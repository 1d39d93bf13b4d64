mod commands;
mod input;
mod output;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use emi_planner_core::tracking::store::JsonFileStore;

use commands::dashboard::DashboardArgs;
use commands::loans::LoanCommand;
use commands::notes::NoteCommand;
use commands::reminders::ReminderCommand;
use commands::schedule::LoanTermsArgs;

/// EMI planning and loan tracking
#[derive(Parser)]
#[command(
    name = "emi",
    version,
    about = "EMI planning and loan tracking",
    long_about = "Compute equated monthly installments and amortization schedules with \
                  decimal precision, save loans, and track their payment reminders."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Path of the JSON file holding saved loans, reminders and notes
    #[arg(long, env = "EMI_STORE", default_value = "emi-store.json", global = true)]
    store: String,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the monthly installment, total interest and total payment
    Installment(LoanTermsArgs),
    /// Month-by-month amortization schedule
    Schedule(LoanTermsArgs),
    /// Year-by-year amortization summary
    Yearly(LoanTermsArgs),
    /// Manage saved loans
    #[command(subcommand)]
    Loan(LoanCommand),
    /// Manage payment reminders
    #[command(subcommand)]
    Reminder(ReminderCommand),
    /// Manage loan notes
    #[command(subcommand)]
    Note(NoteCommand),
    /// Summary of active loans and payments
    Dashboard(DashboardArgs),
    /// Load two sample loans with payment history
    Demo(DashboardArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Info,
        _ => log::LevelFilter::Debug,
    };
    if let Err(e) = simple_logger::SimpleLogger::new().with_level(level).init() {
        eprintln!("{}: logger unavailable: {}", "warning".yellow().bold(), e);
    }
}

fn run(cli: Cli) -> Result<serde_json::Value, Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Installment(args) => commands::schedule::run_installment(args),
        Commands::Schedule(args) => commands::schedule::run_schedule(args),
        Commands::Yearly(args) => commands::schedule::run_yearly(args),
        Commands::Loan(cmd) => {
            let mut store = JsonFileStore::open(&cli.store)?;
            commands::loans::run_loan(cmd, &mut store)
        }
        Commands::Reminder(cmd) => {
            let mut store = JsonFileStore::open(&cli.store)?;
            commands::reminders::run_reminder(cmd, &mut store)
        }
        Commands::Note(cmd) => {
            let mut store = JsonFileStore::open(&cli.store)?;
            commands::notes::run_note(cmd, &mut store)
        }
        Commands::Dashboard(args) => {
            let mut store = JsonFileStore::open(&cli.store)?;
            commands::dashboard::run_dashboard(args, &mut store)
        }
        Commands::Demo(args) => {
            let mut store = JsonFileStore::open(&cli.store)?;
            commands::dashboard::run_demo(args, &mut store)
        }
        Commands::Version => Ok(serde_json::Value::String(format!(
            "emi {}",
            env!("CARGO_PKG_VERSION")
        ))),
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    let format = cli.output.clone();

    match run(cli) {
        Ok(serde_json::Value::String(line)) => {
            println!("{}", line);
            process::exit(0);
        }
        Ok(value) => {
            output::format_output(&format, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
