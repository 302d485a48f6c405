//! Core domain types and shared logic for the veto card-control service.
//!
//! This crate defines the canonical data model used across all other crates:
//! - Blocked-card and retry-counter records
//! - Franchise and frequency calculus (quotas, retry keys, windows)
//! - Command envelope decoding
//! - Clock abstraction for deterministic time
//! - Configuration types

pub mod clock;
pub mod command;
pub mod config;
pub mod error;
pub mod franchise;
pub mod model;
pub mod window;

pub use clock::{Clock, FixedClock, SystemClock};
pub use command::{
    RestoreDailyRequest, RetryOrBlockRequest, StatusRequest, StatusResponse, TransportEvent,
    TransportRecord,
};
pub use error::{Error, Result};
pub use franchise::{Franchise, Frequency, Operation};
pub use model::{BlockType, BlockedCard, BlockedMerchant, RetryCounter, bump_version};

/// One day in milliseconds; the daily retention window, the temporary-block
/// duration and the `hasRetries` horizon all derive from it.
pub const MS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// The monthly retention window: 30 fixed days, no calendar math.
pub const MS_PER_MONTH: i64 = MS_PER_DAY * 30;
