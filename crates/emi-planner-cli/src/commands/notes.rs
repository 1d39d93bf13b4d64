use chrono::Utc;
use clap::{Args, Subcommand};
use serde_json::{json, Value};
use uuid::Uuid;

use emi_planner_core::tracking::note::Note;
use emi_planner_core::tracking::store::LoanStore;

#[derive(Subcommand)]
pub enum NoteCommand {
    /// Attach a note to a loan
    Add(AddNoteArgs),
    /// List notes, optionally filtered by loan, tag or search text
    List(ListNotesArgs),
    /// Delete a note
    Delete(NoteIdArgs),
}

#[derive(Args)]
pub struct AddNoteArgs {
    #[arg(long)]
    pub loan: String,

    #[arg(long)]
    pub title: String,

    #[arg(long, default_value = "")]
    pub content: String,

    /// Comma-separated tags
    #[arg(long, value_delimiter = ',')]
    pub tags: Vec<String>,
}

#[derive(Args)]
pub struct ListNotesArgs {
    #[arg(long)]
    pub loan: Option<String>,

    #[arg(long)]
    pub tag: Option<String>,

    /// Case-insensitive text to find in title or content
    #[arg(long)]
    pub search: Option<String>,
}

#[derive(Args)]
pub struct NoteIdArgs {
    pub id: String,
}

pub fn run_note(
    command: NoteCommand,
    store: &mut dyn LoanStore,
) -> Result<Value, Box<dyn std::error::Error>> {
    match command {
        NoteCommand::Add(args) => {
            let note = Note::new(
                Uuid::new_v4().to_string(),
                args.loan,
                args.title,
                args.content,
                &args.tags,
                Utc::now(),
            )?;
            let value = serde_json::to_value(&note)?;
            store.add_note(note)?;
            Ok(value)
        }
        NoteCommand::List(args) => {
            let notes: Vec<&Note> = store
                .notes()
                .iter()
                .filter(|n| args.loan.as_deref().map_or(true, |id| n.loan_id == id))
                .filter(|n| args.tag.as_deref().map_or(true, |t| n.has_tag(t)))
                .filter(|n| args.search.as_deref().map_or(true, |q| n.matches(q)))
                .collect();
            Ok(serde_json::to_value(notes)?)
        }
        NoteCommand::Delete(args) => {
            let note = store.delete_note(&args.id)?;
            Ok(json!({ "deleted": note.id, "title": note.title }))
        }
    }
}
