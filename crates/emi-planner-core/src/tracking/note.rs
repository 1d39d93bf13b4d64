use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::EmiError;
use crate::EmiResult;

/// Free-text note attached to a loan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub id: String,
    pub loan_id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
}

impl Note {
    /// Tags are trimmed, lowercased and de-duplicated; blank tags are dropped.
    pub fn new(
        id: impl Into<String>,
        loan_id: impl Into<String>,
        title: impl Into<String>,
        content: impl Into<String>,
        tags: &[String],
        created_at: DateTime<Utc>,
    ) -> EmiResult<Note> {
        let title = title.into().trim().to_string();
        if title.is_empty() {
            return Err(EmiError::invalid("title", "Note title cannot be empty"));
        }

        let mut normalized: Vec<String> = Vec::with_capacity(tags.len());
        for tag in tags {
            let tag = tag.trim().to_lowercase();
            if !tag.is_empty() && !normalized.contains(&tag) {
                normalized.push(tag);
            }
        }

        Ok(Note {
            id: id.into(),
            loan_id: loan_id.into(),
            title,
            content: content.into(),
            tags: normalized,
            created_at,
        })
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        let tag = tag.trim().to_lowercase();
        self.tags.iter().any(|t| *t == tag)
    }

    /// Case-insensitive substring search over title and content. A blank
    /// query matches every note.
    pub fn matches(&self, query: &str) -> bool {
        let query = query.trim().to_lowercase();
        query.is_empty()
            || self.title.to_lowercase().contains(&query)
            || self.content.to_lowercase().contains(&query)
    }
}
