use thiserror::Error;

#[derive(Debug, Error)]
pub enum EmiError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Financial impossibility: {0}")]
    FinancialImpossibility(String),

    #[error("Not found: {kind} '{id}'")]
    NotFound { kind: String, id: String },

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Storage error: {0}")]
    Storage(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl EmiError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        EmiError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn not_found(kind: &str, id: &str) -> Self {
        EmiError::NotFound {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl From<serde_json::Error> for EmiError {
    fn from(e: serde_json::Error) -> Self {
        EmiError::SerializationError(e.to_string())
    }
}

impl From<std::io::Error> for EmiError {
    fn from(e: std::io::Error) -> Self {
        EmiError::Storage(e.to_string())
    }
}
