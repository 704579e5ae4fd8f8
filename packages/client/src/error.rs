//! Error types for the chat client.

use thiserror::Error;

use crate::{
    domain::{TransportError, ValidationError},
    session::StorageError,
};

/// Client-specific errors
#[derive(Debug, Error)]
pub enum ClientError {
    /// Input rejected before any request was sent
    #[error("{0}")]
    Validation(#[from] ValidationError),

    /// No access or refresh token is stored
    #[error("Not logged in")]
    NotLoggedIn,

    /// The session could not be renewed; the user has to log in again
    #[error("Login expired, please log in again")]
    SessionExpired,

    /// The server answered with a non-zero application code
    #[error("{msg} (code {code})")]
    Application { code: i64, msg: String },

    /// Unexpected HTTP status without a readable body
    #[error("Unexpected HTTP status {status}")]
    Status { status: u16 },

    /// Network failure talking to the REST API
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Realtime channel failure
    #[error("Connection error: {0}")]
    Transport(#[from] TransportError),

    /// Session persistence failure
    #[error("Session storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Terminal input failure
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The configured server URL is unusable
    #[error("Invalid server URL: {0}")]
    InvalidUrl(String),
}

impl ClientError {
    /// Whether recovering from this error requires logging in again
    pub fn requires_login(&self) -> bool {
        matches!(self, ClientError::NotLoggedIn | ClientError::SessionExpired)
    }
}
