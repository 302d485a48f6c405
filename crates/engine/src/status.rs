//! Status evaluator: the read-side answer for authorizers.
//!
//! The only fail-open surface in the service. A storage outage must not hold
//! authorization hostage, so any read failure yields the zero response and a
//! log line instead of an error.

use crate::metrics;
use std::sync::Arc;
use tracing::{debug, warn};
use veto_core::command::StatusResponse;
use veto_core::{BlockType, Clock, window};
use veto_storage::{CardStore, StorageError};

/// Read-only evaluator over the blocked-card table.
pub struct StatusEvaluator {
    store: Arc<dyn CardStore>,
    clock: Arc<dyn Clock>,
}

impl StatusEvaluator {
    pub fn new(store: Arc<dyn CardStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Answer whether a (card, merchant) pair is blocked and whether it is
    /// still accumulating retries. Never fails; see module docs.
    pub async fn evaluate(&self, card_id: &str, merchant_id: &str) -> StatusResponse {
        if card_id.is_empty() {
            debug!("empty cardID, skipping status lookup");
            return StatusResponse::default();
        }

        let card = match self.store.get_blocked_card(card_id).await {
            Ok(card) => card,
            Err(StorageError::NotFound(_)) => return StatusResponse::default(),
            Err(e) => {
                metrics::FAILOPEN_READS.inc();
                warn!(card_id = %card_id, error = %e, "status read failed, failing open");
                return StatusResponse::default();
            }
        };

        let Some(merchant) = card.blocked_merchants.get(merchant_id) else {
            return StatusResponse::default();
        };

        if merchant.has_block_type(BlockType::Permanent) {
            return StatusResponse {
                blocked: true,
                block_type: BlockType::Permanent.as_str().to_string(),
                has_retries: false,
            };
        }

        let now = self.clock.now_ms();
        let blocked = merchant.expiration_date > now;
        StatusResponse {
            blocked,
            block_type: if blocked {
                BlockType::Temporary.as_str().to_string()
            } else {
                String::new()
            },
            // Independent of blocked: an expired block with a recent retry
            // reports "admit but treat as retry-accumulating".
            has_retries: window::has_recent_retry(merchant.last_retry, now),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::FailingStore;
    use veto_core::{BlockedCard, BlockedMerchant, FixedClock, MS_PER_DAY};
    use veto_storage::MemoryStore;

    const NOW: i64 = 1_700_000_000_000;

    async fn store_with_merchant(merchant: BlockedMerchant) -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        let mut card = BlockedCard {
            card_id: "C1".to_string(),
            time_stamp: 1,
            blocked_merchants: Default::default(),
        };
        card.blocked_merchants.insert("M1".to_string(), merchant);
        store.seed_blocked_card(card).await;
        store
    }

    fn evaluator(store: Arc<dyn CardStore>) -> StatusEvaluator {
        StatusEvaluator::new(store, Arc::new(FixedClock::new(NOW)))
    }

    #[tokio::test]
    async fn permanent_block_short_circuits() {
        let store = store_with_merchant(BlockedMerchant {
            block_type: "PERMANENT".to_string(),
            // Expired and stale on purpose: PERMANENT ignores both.
            expiration_date: NOW - 10_000,
            last_retry: NOW - 1000,
        })
        .await;

        let status = evaluator(store).evaluate("C1", "M1").await;
        assert_eq!(
            status,
            StatusResponse {
                blocked: true,
                block_type: "PERMANENT".to_string(),
                has_retries: false,
            }
        );
    }

    #[tokio::test]
    async fn permanent_match_ignores_case() {
        let store = store_with_merchant(BlockedMerchant {
            block_type: "Permanent".to_string(),
            ..Default::default()
        })
        .await;

        let status = evaluator(store).evaluate("C1", "M1").await;
        assert!(status.blocked);
        assert_eq!(status.block_type, "PERMANENT");
    }

    #[tokio::test]
    async fn unexpired_temporary_block_reports_temporary() {
        let store = store_with_merchant(BlockedMerchant {
            block_type: "TEMPORARY".to_string(),
            expiration_date: NOW + 60_000,
            last_retry: NOW - 1000,
        })
        .await;

        let status = evaluator(store).evaluate("C1", "M1").await;
        assert_eq!(
            status,
            StatusResponse {
                blocked: true,
                block_type: "TEMPORARY".to_string(),
                has_retries: true,
            }
        );
    }

    #[tokio::test]
    async fn expired_temporary_with_recent_retry_admits_but_accumulates() {
        let store = store_with_merchant(BlockedMerchant {
            block_type: "TEMPORARY".to_string(),
            expiration_date: NOW - 1000,
            last_retry: NOW - 1_000_000,
        })
        .await;

        let status = evaluator(store).evaluate("C1", "M1").await;
        assert_eq!(
            status,
            StatusResponse {
                blocked: false,
                block_type: String::new(),
                has_retries: true,
            }
        );
    }

    #[tokio::test]
    async fn stale_last_retry_reports_no_accumulation() {
        let store = store_with_merchant(BlockedMerchant {
            expiration_date: NOW - 1000,
            last_retry: NOW - MS_PER_DAY,
            ..Default::default()
        })
        .await;

        let status = evaluator(store).evaluate("C1", "M1").await;
        assert_eq!(status, StatusResponse::default());
    }

    #[tokio::test]
    async fn empty_card_id_returns_zero_value() {
        let status = evaluator(Arc::new(FailingStore)).evaluate("", "M1").await;
        assert_eq!(status, StatusResponse::default());
    }

    #[tokio::test]
    async fn unknown_card_returns_zero_value() {
        let status = evaluator(Arc::new(MemoryStore::new()))
            .evaluate("C1", "M1")
            .await;
        assert_eq!(status, StatusResponse::default());
    }

    #[tokio::test]
    async fn unknown_merchant_returns_zero_value() {
        let store = store_with_merchant(BlockedMerchant {
            block_type: "PERMANENT".to_string(),
            ..Default::default()
        })
        .await;

        let status = evaluator(store).evaluate("C1", "OTHER").await;
        assert_eq!(status, StatusResponse::default());
    }

    #[tokio::test]
    async fn read_failure_fails_open() {
        let status = evaluator(Arc::new(FailingStore)).evaluate("C1", "M1").await;
        assert_eq!(status, StatusResponse::default());
    }
}
