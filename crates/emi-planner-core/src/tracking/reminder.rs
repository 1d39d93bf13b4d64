use chrono::{DateTime, Days, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EmiError;
use crate::tracking::loan::Loan;
use crate::EmiResult;

/// How many days ahead a payment counts as "upcoming".
pub const DEFAULT_UPCOMING_WINDOW_DAYS: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReminderKind {
    /// A scheduled EMI installment
    Payment,
    /// A free-form to-do attached to a loan
    Task,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reminder {
    pub id: String,
    pub loan_id: String,
    pub title: String,
    pub due_date: NaiveDate,
    pub is_paid: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<DateTime<Utc>>,
    pub kind: ReminderKind,
}

impl Reminder {
    pub fn mark_paid(&mut self, at: DateTime<Utc>) {
        self.is_paid = true;
        self.paid_at = Some(at);
    }

    pub fn mark_unpaid(&mut self) {
        self.is_paid = false;
        self.paid_at = None;
    }

    pub fn is_payment(&self) -> bool {
        self.kind == ReminderKind::Payment
    }

    pub fn is_pending_payment(&self) -> bool {
        self.is_payment() && !self.is_paid
    }
}

/// Due date of installment `index` (1-based) for a loan starting on `start`.
///
/// Month ends clamp, so a loan started on 31 January is first due on the
/// last day of February.
pub fn installment_due_date(start: NaiveDate, index: u32) -> EmiResult<NaiveDate> {
    start.checked_add_months(Months::new(index)).ok_or_else(|| {
        EmiError::DateError(format!("Installment {index} from {start} is out of range"))
    })
}

/// One unpaid payment reminder per installment of `loan`.
pub fn generate_payment_reminders(loan: &Loan) -> EmiResult<Vec<Reminder>> {
    (1..=loan.tenure_months)
        .map(|i| -> EmiResult<Reminder> {
            Ok(Reminder {
                id: format!("{}-emi-{i}", loan.id),
                loan_id: loan.id.clone(),
                title: format!("EMI Payment #{i} - {}", loan.name),
                due_date: installment_due_date(loan.start_date, i)?,
                is_paid: false,
                paid_at: None,
                kind: ReminderKind::Payment,
            })
        })
        .collect()
}

/// A generic to-do attached to a loan.
pub fn task_reminder(
    id: impl Into<String>,
    loan_id: impl Into<String>,
    title: impl Into<String>,
    due_date: NaiveDate,
) -> EmiResult<Reminder> {
    let title = title.into().trim().to_string();
    if title.is_empty() {
        return Err(EmiError::invalid("title", "Reminder title cannot be empty"));
    }
    Ok(Reminder {
        id: id.into(),
        loan_id: loan_id.into(),
        title,
        due_date,
        is_paid: false,
        paid_at: None,
        kind: ReminderKind::Task,
    })
}

/// Unpaid payments due between `today` and `today + window_days`, inclusive,
/// ordered by due date. A window past the calendar range reaches `NaiveDate::MAX`.
pub fn upcoming_payments(
    reminders: &[Reminder],
    today: NaiveDate,
    window_days: i64,
) -> Vec<&Reminder> {
    let horizon = today
        .checked_add_days(Days::new(window_days.max(0).unsigned_abs()))
        .unwrap_or(NaiveDate::MAX);
    let mut upcoming: Vec<&Reminder> = reminders
        .iter()
        .filter(|r| r.is_pending_payment() && r.due_date >= today && r.due_date <= horizon)
        .collect();
    upcoming.sort_by_key(|r| r.due_date);
    upcoming
}

/// Unpaid payments whose due date has passed, oldest first.
pub fn overdue_payments(reminders: &[Reminder], today: NaiveDate) -> Vec<&Reminder> {
    let mut overdue: Vec<&Reminder> = reminders
        .iter()
        .filter(|r| r.is_pending_payment() && r.due_date < today)
        .collect();
    overdue.sort_by_key(|r| r.due_date);
    overdue
}

/// Number of paid installments recorded for `loan_id`.
pub fn installments_paid(reminders: &[Reminder], loan_id: &str) -> u32 {
    reminders
        .iter()
        .filter(|r| r.loan_id == loan_id && r.is_payment() && r.is_paid)
        .count() as u32
}
