// Error handling module
// Typed failures for the token lifecycle and the API call path

use std::fmt;
use thiserror::Error;

/// Errors surfaced by the token manager and the API caller
#[derive(Error, Debug)]
pub enum Error {
    /// The IMS authentication round-trip failed: network error, non-2xx
    /// status, signing failure, or a response missing the token fields
    #[error("authentication failed: {0}")]
    Authentication(String),

    /// The downstream API answered with something that is not the expected
    /// envelope shape
    #[error("invalid API response: {0}")]
    Protocol(String),

    /// Network-layer failure while calling the downstream API, propagated
    /// unchanged from the transport
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Invalid construction input, rejected before any network activity
    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for client operations
pub type Result<T> = std::result::Result<T, Error>;

/// Non-success outcome reported inside the API's own envelope. Returned as a
/// value, never as an [`Error`]: the remote system answered but declined,
/// which callers are expected to handle (user not found, validation error).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiFailure {
    /// The envelope's `result` field
    pub result: String,
    /// The envelope's `message` field, when present
    pub message: Option<String>,
}

impl fmt::Display for ApiFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.message {
            Some(message) => write!(f, "{}: {}", self.result, message),
            None => write!(f, "{}", self.result),
        }
    }
}
