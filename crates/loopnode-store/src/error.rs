//! Error types for loopnode-store.

use thiserror::Error;

/// Result type for store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur reading or writing account files.
#[derive(Debug, Error)]
pub enum Error {
    /// A single line was rejected
    #[error("invalid line {line:?}: {reason}")]
    Validation { line: String, reason: String },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    pub(crate) fn validation(line: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::Validation {
            line: line.into(),
            reason: reason.into(),
        }
    }
}
