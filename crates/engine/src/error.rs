//! Engine error types.

use thiserror::Error;
use veto_storage::StorageError;

/// Command-processing errors.
///
/// Anything other than success fails the whole command; the transport's
/// at-least-once delivery supplies the retry loop, and after repeated
/// failures the payload lands on the dead-letter sink.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The envelope or its JSON body could not be decoded into a typed
    /// request.
    #[error(transparent)]
    Malformed(#[from] veto_core::Error),

    /// A storage operation failed, including optimistic-concurrency
    /// conflicts. NotFound never escapes the engine as an error except from
    /// the restore pipeline, where a missing blocked-card record fails the
    /// command.
    #[error(transparent)]
    Storage(#[from] StorageError),
}

impl EngineError {
    /// Whether this failure is an optimistic-concurrency conflict; the next
    /// delivery will observe the newer version.
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::Storage(StorageError::PreconditionFailed(_)))
    }
}

/// Result type for command handlers.
pub type EngineResult<T> = std::result::Result<T, EngineError>;
