//! Error type shared by the library.

use thiserror::Error;

/// Errors produced by the harvesting library.
///
/// `Fetch` and `Parse` are task-level: the batch orchestrator contains them at the
/// single-task boundary. Everything else surfaces to the caller.
#[derive(Error, Debug)]
pub enum AppError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Initialization failed: {0}")]
    Initialization(String),

    #[error("Invalid batch input: {0}")]
    Validation(String),

    #[error("Failed to fetch '{url}': {reason}")]
    Fetch { url: String, reason: String },

    #[error("Failed to parse document from '{url}': {reason}")]
    Parse { url: String, reason: String },

    #[error("URL parsing failed: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Whether the error is contained to a single batch task.
    pub fn is_task_level(&self) -> bool {
        matches!(self, AppError::Fetch { .. } | AppError::Parse { .. })
    }
}

pub type Result<T> = std::result::Result<T, AppError>;
