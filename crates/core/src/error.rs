//! Error types for the core domain.

use thiserror::Error;

/// Core domain error type.
#[derive(Debug, Error)]
pub enum Error {
    #[error("malformed command: {0}")]
    MalformedCommand(String),

    #[error("unknown franchise: {0}")]
    UnknownFranchise(String),

    #[error("unknown operation: {0}")]
    UnknownOperation(String),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type alias for core operations.
pub type Result<T> = std::result::Result<T, Error>;
