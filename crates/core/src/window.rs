//! Sliding-window retention and block-expiry computation.
//!
//! All comparisons are against a `now` sampled once per command, so a single
//! retry event contributes the same timestamp to every frequency it touches.

use crate::MS_PER_DAY;
use crate::franchise::Frequency;

/// Build the pruned retry list for an incoming event: the new event first,
/// followed by prior events still inside the frequency's retention window.
///
/// The window is strict: a timestamp exactly `retention_ms` old is dropped.
pub fn prune_retries(now_ms: i64, existing: &[i64], frequency: Frequency) -> Vec<i64> {
    let cutoff = now_ms - frequency.retention_ms();
    let mut retries = Vec::with_capacity(existing.len() + 1);
    retries.push(now_ms);
    retries.extend(existing.iter().copied().filter(|&retry| retry > cutoff));
    retries
}

/// Expiry instant for an engine-issued temporary block.
pub fn temporary_block_expiry(now_ms: i64) -> i64 {
    now_ms + MS_PER_DAY
}

/// Whether the most recent recorded retry still counts as accumulating:
/// `lastRetry + 24h > now`, a moving reference anchored on the last event.
pub fn has_recent_retry(last_retry_ms: i64, now_ms: i64) -> bool {
    last_retry_ms + MS_PER_DAY > now_ms
}
