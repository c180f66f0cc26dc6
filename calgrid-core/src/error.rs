//! Error types for calgrid.

use thiserror::Error;

/// Errors that can occur in calgrid operations.
#[derive(Error, Debug)]
pub enum CalGridError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid month: {0}")]
    InvalidMonth(String),

    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    #[error("Invalid date '{0}'")]
    InvalidDate(String),

    #[error("Request to event service failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Event service responded with {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl CalGridError {
    /// Whether the remote service was reached and answered with a failure status.
    pub fn is_status(&self) -> bool {
        matches!(self, CalGridError::Status { .. })
    }
}

/// Result type alias for calgrid operations.
pub type CalGridResult<T> = Result<T, CalGridError>;
