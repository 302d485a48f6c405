//! Storage error types.

use thiserror::Error;

/// Storage operation errors.
#[derive(Debug, Error)]
pub enum StorageError {
    /// The requested record does not exist. A legitimate state for the
    /// engine (it triggers record creation), not an outage.
    #[error("record not found: {0}")]
    NotFound(String),

    /// A create-only write found an existing record.
    #[error("record already exists: {0}")]
    AlreadyExists(String),

    /// A version-guarded write observed a different stored version. The
    /// command fails and the transport's re-delivery supplies the retry.
    #[error("optimistic precondition failed: {0}")]
    PreconditionFailed(String),

    /// Network, auth or throttling failure from the backing store.
    #[error("storage unavailable: {0}")]
    Unavailable(#[from] Box<dyn std::error::Error + Send + Sync>),

    #[error("configuration error: {0}")]
    Config(String),
}

/// Result type for storage operations.
pub type StorageResult<T> = std::result::Result<T, StorageError>;
