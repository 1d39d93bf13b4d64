pub mod dashboard;
pub mod loans;
pub mod notes;
pub mod reminders;
pub mod schedule;
