//! Persistence for saved loans, their reminders and notes.
//!
//! `LoanStore` is the seam callers program against. `InMemoryLoanStore` keeps
//! everything in insertion order; `JsonFileStore` wraps it and rewrites a JSON
//! file after every mutation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::error::EmiError;
use crate::tracking::loan::Loan;
use crate::tracking::note::Note;
use crate::tracking::reminder::{generate_payment_reminders, Reminder};
use crate::EmiResult;

pub trait LoanStore {
    fn loans(&self) -> &[Loan];
    fn reminders(&self) -> &[Reminder];
    fn notes(&self) -> &[Note];

    /// Save a loan and materialize one payment reminder per installment.
    fn add_loan(&mut self, loan: Loan) -> EmiResult<()>;

    /// Save a loan with a caller-built reminder set (e.g. partly paid history).
    fn import_loan(&mut self, loan: Loan, reminders: Vec<Reminder>) -> EmiResult<()>;

    fn close_loan(&mut self, id: &str, at: DateTime<Utc>) -> EmiResult<()>;
    fn restore_loan(&mut self, id: &str) -> EmiResult<()>;

    /// Remove a loan together with its reminders and notes.
    fn delete_loan(&mut self, id: &str) -> EmiResult<Loan>;

    fn add_reminder(&mut self, reminder: Reminder) -> EmiResult<()>;

    /// `Some(at)` marks the reminder paid at `at`; `None` marks it unpaid.
    ///
    /// Installments of a loan are settled in order: an installment can only be
    /// paid once every earlier one is paid, and only the latest paid one can
    /// be unpaid.
    fn set_reminder_paid(&mut self, id: &str, paid_at: Option<DateTime<Utc>>) -> EmiResult<()>;

    fn add_note(&mut self, note: Note) -> EmiResult<()>;
    fn delete_note(&mut self, id: &str) -> EmiResult<Note>;

    fn loan(&self, id: &str) -> EmiResult<&Loan> {
        self.loans()
            .iter()
            .find(|l| l.id == id)
            .ok_or_else(|| EmiError::not_found("loan", id))
    }

    fn active_loans(&self) -> Vec<&Loan> {
        self.loans().iter().filter(|l| l.is_active()).collect()
    }

    fn closed_loans(&self) -> Vec<&Loan> {
        self.loans().iter().filter(|l| !l.is_active()).collect()
    }

    fn reminders_for(&self, loan_id: &str) -> Vec<&Reminder> {
        self.reminders().iter().filter(|r| r.loan_id == loan_id).collect()
    }

    fn notes_for(&self, loan_id: &str) -> Vec<&Note> {
        self.notes().iter().filter(|n| n.loan_id == loan_id).collect()
    }
}

// ---------------------------------------------------------------------------
// In-memory
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct InMemoryLoanStore {
    #[serde(default)]
    loans: Vec<Loan>,
    #[serde(default)]
    reminders: Vec<Reminder>,
    #[serde(default)]
    notes: Vec<Note>,
}

impl InMemoryLoanStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_loan_absent(&self, id: &str) -> EmiResult<()> {
        if self.loans.iter().any(|l| l.id == id) {
            return Err(EmiError::Conflict(format!("Loan '{id}' already exists")));
        }
        Ok(())
    }

    fn ensure_loan_present(&self, id: &str) -> EmiResult<()> {
        if !self.loans.iter().any(|l| l.id == id) {
            return Err(EmiError::not_found("loan", id));
        }
        Ok(())
    }

    /// Paying requires every earlier installment of the loan to be paid;
    /// unpaying requires every later one to be unpaid. Tasks are unordered.
    fn ensure_in_sequence(&self, target: &Reminder, paying: bool) -> EmiResult<()> {
        if !target.is_payment() {
            return Ok(());
        }
        let siblings = self
            .reminders
            .iter()
            .filter(|r| r.is_payment() && r.loan_id == target.loan_id && r.id != target.id);
        if paying {
            if let Some(earlier) = siblings
                .filter(|r| r.due_date < target.due_date && !r.is_paid)
                .min_by_key(|r| r.due_date)
            {
                return Err(EmiError::Conflict(format!(
                    "Complete previous EMIs first: '{}' due {} is unpaid",
                    earlier.id, earlier.due_date
                )));
            }
        } else if let Some(later) = siblings
            .filter(|r| r.due_date > target.due_date && r.is_paid)
            .max_by_key(|r| r.due_date)
        {
            return Err(EmiError::Conflict(format!(
                "Unpay later EMIs first: '{}' due {} is paid",
                later.id, later.due_date
            )));
        }
        Ok(())
    }

    fn loan_mut(&mut self, id: &str) -> EmiResult<&mut Loan> {
        self.loans
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or_else(|| EmiError::not_found("loan", id))
    }
}

impl LoanStore for InMemoryLoanStore {
    fn loans(&self) -> &[Loan] {
        &self.loans
    }

    fn reminders(&self) -> &[Reminder] {
        &self.reminders
    }

    fn notes(&self) -> &[Note] {
        &self.notes
    }

    fn add_loan(&mut self, loan: Loan) -> EmiResult<()> {
        let reminders = generate_payment_reminders(&loan)?;
        self.import_loan(loan, reminders)
    }

    fn import_loan(&mut self, loan: Loan, reminders: Vec<Reminder>) -> EmiResult<()> {
        self.ensure_loan_absent(&loan.id)?;
        if let Some(stray) = reminders.iter().find(|r| r.loan_id != loan.id) {
            return Err(EmiError::invalid(
                "reminders",
                format!("Reminder '{}' belongs to loan '{}'", stray.id, stray.loan_id),
            ));
        }
        for reminder in &reminders {
            if self.reminders.iter().any(|r| r.id == reminder.id) {
                return Err(EmiError::Conflict(format!(
                    "Reminder '{}' already exists",
                    reminder.id
                )));
            }
        }

        log::info!(
            "saved loan '{}' ({}, emi {}) with {} reminders",
            loan.id,
            loan.loan_type,
            loan.emi,
            reminders.len()
        );
        self.loans.push(loan);
        self.reminders.extend(reminders);
        Ok(())
    }

    fn close_loan(&mut self, id: &str, at: DateTime<Utc>) -> EmiResult<()> {
        self.loan_mut(id)?.close(at)?;
        log::info!("closed loan '{id}'");
        Ok(())
    }

    fn restore_loan(&mut self, id: &str) -> EmiResult<()> {
        self.loan_mut(id)?.restore()?;
        log::info!("restored loan '{id}'");
        Ok(())
    }

    fn delete_loan(&mut self, id: &str) -> EmiResult<Loan> {
        let pos = self
            .loans
            .iter()
            .position(|l| l.id == id)
            .ok_or_else(|| EmiError::not_found("loan", id))?;
        let loan = self.loans.remove(pos);
        self.reminders.retain(|r| r.loan_id != id);
        self.notes.retain(|n| n.loan_id != id);
        log::info!("deleted loan '{id}' with its reminders and notes");
        Ok(loan)
    }

    fn add_reminder(&mut self, reminder: Reminder) -> EmiResult<()> {
        self.ensure_loan_present(&reminder.loan_id)?;
        if self.reminders.iter().any(|r| r.id == reminder.id) {
            return Err(EmiError::Conflict(format!(
                "Reminder '{}' already exists",
                reminder.id
            )));
        }
        log::info!(
            "added reminder '{}' for loan '{}' due {}",
            reminder.id,
            reminder.loan_id,
            reminder.due_date
        );
        self.reminders.push(reminder);
        Ok(())
    }

    fn set_reminder_paid(&mut self, id: &str, paid_at: Option<DateTime<Utc>>) -> EmiResult<()> {
        let pos = self
            .reminders
            .iter()
            .position(|r| r.id == id)
            .ok_or_else(|| EmiError::not_found("reminder", id))?;
        self.ensure_in_sequence(&self.reminders[pos], paid_at.is_some())?;

        let reminder = &mut self.reminders[pos];
        match paid_at {
            Some(at) => {
                reminder.mark_paid(at);
                log::info!("reminder '{id}' marked paid");
            }
            None => {
                reminder.mark_unpaid();
                log::info!("reminder '{id}' marked unpaid");
            }
        }
        Ok(())
    }

    fn add_note(&mut self, note: Note) -> EmiResult<()> {
        self.ensure_loan_present(&note.loan_id)?;
        if self.notes.iter().any(|n| n.id == note.id) {
            return Err(EmiError::Conflict(format!("Note '{}' already exists", note.id)));
        }
        log::info!("added note '{}' to loan '{}'", note.id, note.loan_id);
        self.notes.push(note);
        Ok(())
    }

    fn delete_note(&mut self, id: &str) -> EmiResult<Note> {
        let pos = self
            .notes
            .iter()
            .position(|n| n.id == id)
            .ok_or_else(|| EmiError::not_found("note", id))?;
        let note = self.notes.remove(pos);
        log::info!("deleted note '{id}' from loan '{}'", note.loan_id);
        Ok(note)
    }
}

// ---------------------------------------------------------------------------
// JSON file
// ---------------------------------------------------------------------------

/// A store persisted as a single JSON document.
#[derive(Debug)]
pub struct JsonFileStore {
    path: PathBuf,
    inner: InMemoryLoanStore,
}

impl JsonFileStore {
    /// Load `path`, starting empty if the file does not exist yet.
    pub fn open(path: impl AsRef<Path>) -> EmiResult<Self> {
        let path = path.as_ref().to_path_buf();
        let inner = if path.exists() {
            let contents = fs::read_to_string(&path).map_err(|e| {
                EmiError::Storage(format!("Failed to read '{}': {}", path.display(), e))
            })?;
            if contents.trim().is_empty() {
                InMemoryLoanStore::new()
            } else {
                serde_json::from_str(&contents)?
            }
        } else {
            log::warn!("store file '{}' not found; starting empty", path.display());
            InMemoryLoanStore::new()
        };
        Ok(JsonFileStore { path, inner })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn save(&self) -> EmiResult<()> {
        write_atomically(&self.path, &self.inner)
    }

    /// Apply `op` to a copy and keep it only once it is on disk, so a failed
    /// write leaves memory and file in agreement.
    fn mutate<T>(
        &mut self,
        op: impl FnOnce(&mut InMemoryLoanStore) -> EmiResult<T>,
    ) -> EmiResult<T> {
        let mut next = self.inner.clone();
        let out = op(&mut next)?;
        write_atomically(&self.path, &next)?;
        self.inner = next;
        Ok(out)
    }
}

/// Write to a sibling temp file, then rename over the target.
fn write_atomically(path: &Path, store: &InMemoryLoanStore) -> EmiResult<()> {
    let json = serde_json::to_string_pretty(store)?;
    let mut tmp = path.to_path_buf().into_os_string();
    tmp.push(".tmp");
    let tmp = PathBuf::from(tmp);
    fs::write(&tmp, json).map_err(|e| {
        EmiError::Storage(format!("Failed to write '{}': {}", tmp.display(), e))
    })?;
    fs::rename(&tmp, path)?;
    log::debug!("store written to '{}'", path.display());
    Ok(())
}

impl LoanStore for JsonFileStore {
    fn loans(&self) -> &[Loan] {
        self.inner.loans()
    }

    fn reminders(&self) -> &[Reminder] {
        self.inner.reminders()
    }

    fn notes(&self) -> &[Note] {
        self.inner.notes()
    }

    fn add_loan(&mut self, loan: Loan) -> EmiResult<()> {
        self.mutate(|s| s.add_loan(loan))
    }

    fn import_loan(&mut self, loan: Loan, reminders: Vec<Reminder>) -> EmiResult<()> {
        self.mutate(|s| s.import_loan(loan, reminders))
    }

    fn close_loan(&mut self, id: &str, at: DateTime<Utc>) -> EmiResult<()> {
        self.mutate(|s| s.close_loan(id, at))
    }

    fn restore_loan(&mut self, id: &str) -> EmiResult<()> {
        self.mutate(|s| s.restore_loan(id))
    }

    fn delete_loan(&mut self, id: &str) -> EmiResult<Loan> {
        self.mutate(|s| s.delete_loan(id))
    }

    fn add_reminder(&mut self, reminder: Reminder) -> EmiResult<()> {
        self.mutate(|s| s.add_reminder(reminder))
    }

    fn set_reminder_paid(&mut self, id: &str, paid_at: Option<DateTime<Utc>>) -> EmiResult<()> {
        self.mutate(|s| s.set_reminder_paid(id, paid_at))
    }

    fn add_note(&mut self, note: Note) -> EmiResult<()> {
        self.mutate(|s| s.add_note(note))
    }

    fn delete_note(&mut self, id: &str) -> EmiResult<Note> {
        self.mutate(|s| s.delete_note(id))
    }
}
