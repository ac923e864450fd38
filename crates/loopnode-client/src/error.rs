//! Error types for loopnode-client.

use std::fmt;
use thiserror::Error;

/// Result type for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// A failed HTTP exchange.
///
/// `status` is set when the server answered with a non-success code and is
/// `None` for transport failures (DNS, connect, TLS, proxy).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NetworkError {
    pub status: Option<u16>,
    pub message: String,
}

impl NetworkError {
    pub fn transport(message: impl Into<String>) -> Self {
        Self {
            status: None,
            message: message.into(),
        }
    }

    pub fn status(status: u16, message: impl Into<String>) -> Self {
        Self {
            status: Some(status),
            message: message.into(),
        }
    }
}

impl fmt::Display for NetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.status {
            Some(status) => write!(f, "HTTP {}: {}", status, self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

impl std::error::Error for NetworkError {}

/// Errors returned by [`crate::ApiClient`].
#[derive(Debug, Error)]
pub enum Error {
    /// Request did not complete with a success status
    #[error("network error: {0}")]
    Network(#[from] NetworkError),

    /// Response body lacked an expected field
    #[error("unexpected response: {0}")]
    Decode(String),

    /// Registration refused because the account already exists
    #[error("account already exists")]
    AuthConflict,
}
