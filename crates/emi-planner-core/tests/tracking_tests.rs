use chrono::{NaiveDate, TimeZone, Utc};
use emi_planner_core::tracking::dashboard::summarize_store;
use emi_planner_core::tracking::demo::seed_demo_data;
use emi_planner_core::tracking::loan::{Loan, LoanStatus, LoanType, NewLoan};
use emi_planner_core::tracking::note::Note;
use emi_planner_core::tracking::reminder::{task_reminder, upcoming_payments};
use emi_planner_core::tracking::store::{InMemoryLoanStore, JsonFileStore, LoanStore};
use emi_planner_core::EmiError;
use pretty_assertions::assert_eq;
use rust_decimal_macros::dec;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn education_loan(id: &str) -> Loan {
    Loan::create(
        id,
        NewLoan {
            name: "MBA Loan".into(),
            loan_type: LoanType::Education,
            principal: dec!(800_000),
            annual_rate_percent: dec!(10),
            tenure_months: 30,
            start_date: date(2025, 1, 5),
        },
    )
    .unwrap()
}

// ===========================================================================
// JSON file store
// ===========================================================================

#[test]
fn test_file_store_round_trips_through_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    {
        let mut store = JsonFileStore::open(&path).unwrap();
        assert!(store.loans().is_empty());
        store.add_loan(education_loan("edu")).unwrap();
        store
            .set_reminder_paid("edu-emi-1", Some(Utc.with_ymd_and_hms(2025, 2, 5, 8, 0, 0).unwrap()))
            .unwrap();
        let note = Note::new("n1", "edu", "Moratorium", "Ask about deferral", &[], Utc::now()).unwrap();
        store.add_note(note).unwrap();
    }

    let reopened = JsonFileStore::open(&path).unwrap();
    assert_eq!(reopened.loans().len(), 1);
    assert_eq!(reopened.loans()[0], education_loan("edu"));
    assert_eq!(reopened.reminders_for("edu").len(), 30);
    assert!(reopened.reminders()[0].is_paid);
    assert_eq!(reopened.notes_for("edu")[0].title, "Moratorium");
}

#[test]
fn test_file_store_rejects_corrupt_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        JsonFileStore::open(&path),
        Err(EmiError::SerializationError(_))
    ));
}

#[test]
fn test_failed_mutation_leaves_file_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    store.add_loan(education_loan("edu")).unwrap();
    let before = std::fs::read_to_string(&path).unwrap();

    assert!(store.add_loan(education_loan("edu")).is_err());
    assert!(store.close_loan("missing", Utc::now()).is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), before);
}

#[test]
fn test_failed_write_keeps_memory_in_step_with_disk() {
    let dir = tempfile::tempdir().unwrap();
    // Parent directory never exists, so every write fails
    let path = dir.path().join("missing").join("store.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    assert!(matches!(
        store.add_loan(education_loan("edu")),
        Err(EmiError::Storage(_))
    ));
    assert!(store.loans().is_empty());
    assert!(store.reminders().is_empty());
    assert!(!path.exists());
}

#[test]
fn test_out_of_order_payment_rejected_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("store.json");

    let mut store = JsonFileStore::open(&path).unwrap();
    store.add_loan(education_loan("edu")).unwrap();
    assert!(matches!(
        store.set_reminder_paid("edu-emi-3", Some(Utc::now())),
        Err(EmiError::Conflict(_))
    ));

    let reopened = JsonFileStore::open(&path).unwrap();
    assert!(reopened.reminders().iter().all(|r| !r.is_paid));
}

// ===========================================================================
// Loan lifecycle through the store trait
// ===========================================================================

fn lifecycle<S: LoanStore>(store: &mut S) {
    store.add_loan(education_loan("edu")).unwrap();
    let due = date(2025, 3, 1);
    store
        .add_reminder(task_reminder("edu-task-1", "edu", "Upload fee receipt", due).unwrap())
        .unwrap();
    assert_eq!(store.reminders_for("edu").len(), 31);

    store.close_loan("edu", Utc::now()).unwrap();
    assert_eq!(store.loan("edu").unwrap().status, LoanStatus::Closed);
    assert!(store.active_loans().is_empty());

    store.restore_loan("edu").unwrap();
    assert_eq!(store.active_loans().len(), 1);

    store.delete_loan("edu").unwrap();
    assert!(store.loans().is_empty());
    assert!(store.reminders().is_empty());
}

#[test]
fn test_lifecycle_in_memory() {
    lifecycle(&mut InMemoryLoanStore::new());
}

#[test]
fn test_lifecycle_on_disk() {
    let dir = tempfile::tempdir().unwrap();
    lifecycle(&mut JsonFileStore::open(dir.path().join("s.json")).unwrap());
}

// ===========================================================================
// Reminders and dashboard
// ===========================================================================

#[test]
fn test_saved_emi_matches_schedule() {
    let loan = education_loan("edu");
    let plan = loan.schedule().unwrap();
    assert_eq!(loan.emi, plan.report().installment_amount);
    assert_eq!(plan.yearly_summary.len(), 3);
}

#[test]
fn test_upcoming_payments_in_store() {
    let mut store = InMemoryLoanStore::new();
    store.add_loan(education_loan("edu")).unwrap();
    // First installment falls due 2025-02-05
    let up = upcoming_payments(store.reminders(), date(2025, 2, 2), 3);
    assert_eq!(up.len(), 1);
    assert_eq!(up[0].id, "edu-emi-1");
}

#[test]
fn test_dashboard_tracks_payments() {
    let mut store = InMemoryLoanStore::new();
    let today = date(2025, 6, 10);
    seed_demo_data(&mut store, today, "d").unwrap();
    store.add_loan(education_loan("edu")).unwrap();
    store.set_reminder_paid("edu-emi-1", Some(Utc::now())).unwrap();

    let summary = summarize_store(&store, today).unwrap();
    assert_eq!(summary.active_loans, 3);
    let edu = summary.loans.iter().find(|l| l.loan_id == "edu").unwrap();
    assert_eq!(edu.installments_paid, 1);
    assert_eq!(edu.next_due_date, Some(date(2025, 3, 5)));
    // edu-emi-2..edu-emi-5 (Mar..Jun 5) are overdue
    assert_eq!(summary.payments_overdue, 4);
}
