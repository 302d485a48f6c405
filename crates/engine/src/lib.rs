//! Retry-quota and block state machine for veto.
//!
//! This crate hosts the command-processing core:
//! - [`BlockEngine`]: consumes retry/block commands, updates counters with
//!   optimistic concurrency and decides blocking
//! - [`StatusEvaluator`]: the read-side answer for authorizers (fail-open)
//! - [`RestorePipeline`]: clears a pair's daily retry accumulators
//! - [`DeadLetterSink`]: terminal consumer for exhausted commands
//!
//! Handlers are stateless; one logical worker processes one command to
//! completion, and correctness across workers rests on the storage layer's
//! version-guarded writes rather than in-process locks.

pub mod deadletter;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod notify;
pub mod restore;
pub mod status;

pub use deadletter::DeadLetterSink;
pub use engine::BlockEngine;
pub use error::{EngineError, EngineResult};
pub use notify::{ErrorNotifier, LogNotifier, RollbarNotifier};
pub use restore::RestorePipeline;
pub use status::StatusEvaluator;

#[cfg(test)]
pub(crate) mod testutil;
