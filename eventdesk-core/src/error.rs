//! Error types for eventdesk.

use thiserror::Error;

/// Errors that can occur in eventdesk operations.
#[derive(Error, Debug)]
pub enum EventDeskError {
    #[error("Failed to load events: {0}")]
    Load(String),

    #[error("{path} does not exist yet")]
    NotFound { path: String },

    #[error("GitHub rejected the credentials ({status}): {body}")]
    Auth { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Could not read {path} from GitHub ({status}): {body}")]
    UnexpectedStatus {
        path: String,
        status: u16,
        body: String,
    },

    #[error("GitHub upload failed ({status}): {body}")]
    Write { status: u16, body: String },

    #[error("{0}")]
    Validation(String),

    #[error("Event {index} does not exist (the list has {len} events)")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<reqwest::Error> for EventDeskError {
    fn from(value: reqwest::Error) -> Self {
        if value.is_timeout() {
            return Self::Network(format!("request timed out: {value}"));
        }
        Self::Network(value.to_string())
    }
}

/// Result type alias for eventdesk operations.
pub type EventDeskResult<T> = Result<T, EventDeskError>;
