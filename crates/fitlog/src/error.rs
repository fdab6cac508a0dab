use thiserror::Error;

use crate::models::ValidationError;

/// Main error type for fitlog
#[derive(Error, Debug)]
pub enum FitlogError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Failed to decode {path}: {message}")]
    Decode { path: String, message: String },

    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("Activity starting at {0} is already stored")]
    Duplicate(String),

    #[error("Rolled back after a uniqueness conflict: {0}")]
    Conflict(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Pace is undefined when average speed is zero")]
    UndefinedPace,

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid date format: {0}. Expected YYYY-MM-DD or YYYY-MM-DD HH:MM:SS")]
    InvalidDateFormat(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, FitlogError>;

impl FitlogError {
    /// Create a configuration error from a message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a decode error for a source file
    pub fn decode(path: impl Into<String>, msg: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            message: msg.into(),
        }
    }

    /// Create an invalid query error from a message
    pub fn invalid_query(msg: impl Into<String>) -> Self {
        Self::InvalidQuery(msg.into())
    }

    /// Whether this error is scoped to a single source file.
    ///
    /// Ingestion skips the file and carries on for these; anything else ends
    /// the batch.
    pub fn is_per_file(&self) -> bool {
        matches!(
            self,
            FitlogError::Decode { .. }
                | FitlogError::Validation(_)
                | FitlogError::Duplicate(_)
                | FitlogError::Conflict(_)
        )
    }
}

impl From<rusqlite::Error> for FitlogError {
    fn from(err: rusqlite::Error) -> Self {
        FitlogError::Database(err.to_string())
    }
}

/// Render an error for the terminal, with a hint where one helps
pub fn format_user_error(err: &FitlogError) -> String {
    match err {
        FitlogError::Config(_) => format!(
            "{}\nHint: pass --src with a directory of recordings (optionally containing an Activity/ subdirectory).",
            err
        ),
        FitlogError::InvalidQuery(_) => format!(
            "{}\nHint: group-by accepts week, month, year or all; see 'fitlog summary --help' for column names.",
            err
        ),
        _ => err.to_string(),
    }
}
