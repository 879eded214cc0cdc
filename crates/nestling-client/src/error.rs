//! Error types for the client core.

use thiserror::Error;

/// Client error types.
#[derive(Error, Debug)]
pub enum ClientError {
    /// Non-success response; `message` is the backend's detail collapsed
    /// into a display string.
    #[error("{message}")]
    Api { status: u16, message: String },

    #[error(transparent)]
    Refresh(#[from] RefreshError),

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Failure of the token refresh call. Terminal for the session, and
/// cloneable so every caller queued behind the refresh receives it.
#[derive(Error, Debug, Clone)]
#[error("session refresh failed: {message}")]
pub struct RefreshError {
    pub message: String,
}

impl RefreshError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Result type alias for client operations.
pub type Result<T> = std::result::Result<T, ClientError>;
