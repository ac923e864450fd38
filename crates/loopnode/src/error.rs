//! Error types for loopnode.

use thiserror::Error;

/// Result type for loopnode operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in loopnode.
#[derive(Debug, Error)]
pub enum Error {
    /// Bad configuration value
    #[error("Config error: {0}")]
    Config(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_errors_convert() {
        fn open() -> Result<()> {
            std::fs::read("/definitely/not/here")?;
            Ok(())
        }
        assert!(matches!(open(), Err(Error::Io(_))));
    }
}
