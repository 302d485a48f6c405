//! Persisted records for the blocked-card and retry-counter tables.
//!
//! Field names follow the wire names of the underlying tables (`cardID`,
//! `timeStamp`, ...) so the same types serialize for storage marshalling and
//! for logging.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Blocked-card record, one per card identifier.
///
/// `time_stamp` is the optimistic-concurrency version: every mutating write
/// is conditioned on the version observed when the record was read.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockedCard {
    #[serde(rename = "cardID")]
    pub card_id: String,
    #[serde(rename = "timeStamp")]
    pub time_stamp: i64,
    /// Sparse: only merchants that ever blocked the card or recorded a
    /// `lastRetry` appear.
    #[serde(rename = "blockedMerchants", default)]
    pub blocked_merchants: HashMap<String, BlockedMerchant>,
}

/// Per-merchant block state inside a [`BlockedCard`].
///
/// An empty `block_type` means "no active block, only retry metadata". A
/// merchant entry persists past expiry; a TEMPORARY block goes soft-inactive
/// once `expiration_date` is in the past.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct BlockedMerchant {
    #[serde(rename = "expirationDate", default)]
    pub expiration_date: i64,
    /// Stored as a free string and compared case-insensitively on read;
    /// other writers are not guaranteed to normalize the casing.
    #[serde(rename = "blockType", default)]
    pub block_type: String,
    #[serde(rename = "lastRetry", default)]
    pub last_retry: i64,
}

impl BlockedMerchant {
    /// Whether this entry carries the given block type, ignoring case.
    pub fn has_block_type(&self, block_type: BlockType) -> bool {
        self.block_type.eq_ignore_ascii_case(block_type.as_str())
    }
}

/// Retry-counter record, one per (card, merchant, frequency) tuple.
///
/// `retry_key` is the composed primary key; `card_id` and `merchant_id` are
/// denormalized for the secondary index used by the restore pipeline.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RetryCounter {
    #[serde(rename = "retryKey")]
    pub retry_key: String,
    #[serde(rename = "cardID")]
    pub card_id: String,
    #[serde(rename = "merchantID")]
    pub merchant_id: String,
    /// Event timestamps (ms), newest first after pruning.
    #[serde(default)]
    pub retries: Vec<i64>,
    #[serde(rename = "timeStamp")]
    pub time_stamp: i64,
}

/// Block kinds the engine writes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlockType {
    /// Admin-issued indefinite block.
    Permanent,
    /// Engine-issued 24 h block after quota overflow.
    Temporary,
}

impl BlockType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Permanent => "PERMANENT",
            Self::Temporary => "TEMPORARY",
        }
    }
}

impl std::fmt::Display for BlockType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Next version for a version-guarded write.
///
/// Versions are wall-clock milliseconds, but a record created and mutated
/// within the same millisecond would not move forward with `now` alone.
pub fn bump_version(now_ms: i64, observed: i64) -> i64 {
    now_ms.max(observed + 1)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_type_match_is_case_insensitive() {
        let merchant = BlockedMerchant {
            block_type: "permanent".to_string(),
            ..Default::default()
        };
        assert!(merchant.has_block_type(BlockType::Permanent));
        assert!(!merchant.has_block_type(BlockType::Temporary));
    }

    #[test]
    fn empty_block_type_matches_nothing() {
        let merchant = BlockedMerchant::default();
        assert!(!merchant.has_block_type(BlockType::Permanent));
        assert!(!merchant.has_block_type(BlockType::Temporary));
    }

    #[test]
    fn bump_version_moves_strictly_forward() {
        assert_eq!(bump_version(2_000, 1_000), 2_000);
        assert_eq!(bump_version(1_000, 1_000), 1_001);
        assert_eq!(bump_version(500, 1_000), 1_001);
    }

    #[test]
    fn blocked_card_uses_wire_field_names() {
        let card = BlockedCard {
            card_id: "C1".to_string(),
            time_stamp: 42,
            blocked_merchants: HashMap::new(),
        };
        let json = serde_json::to_value(&card).unwrap();
        assert_eq!(json["cardID"], "C1");
        assert_eq!(json["timeStamp"], 42);
        assert!(json["blockedMerchants"].is_object());
    }
}
