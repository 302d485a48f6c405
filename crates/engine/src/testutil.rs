//! Test doubles shared across the engine's test modules.

use async_trait::async_trait;
use veto_core::{BlockedCard, BlockedMerchant, RetryCounter};
use veto_storage::{CardStore, RetryCounterUpsert, StorageError, StorageResult};

fn outage(operation: &str) -> StorageError {
    StorageError::Unavailable(
        format!("injected outage during {operation}").into(),
    )
}

/// Store where every operation fails with an outage. Commands that must not
/// touch storage run against it; commands that must propagate storage
/// failures assert on its error.
pub struct FailingStore;

#[async_trait]
impl CardStore for FailingStore {
    async fn get_blocked_card(&self, _card_id: &str) -> StorageResult<BlockedCard> {
        Err(outage("get_blocked_card"))
    }

    async fn put_blocked_card(&self, _card: &BlockedCard) -> StorageResult<()> {
        Err(outage("put_blocked_card"))
    }

    async fn update_blocked_card_merchant(
        &self,
        _card_id: &str,
        _merchant_id: &str,
        _merchant: &BlockedMerchant,
        _expected_version: i64,
        _new_version: i64,
    ) -> StorageResult<()> {
        Err(outage("update_blocked_card_merchant"))
    }

    async fn get_retry_counter(&self, _retry_key: &str) -> StorageResult<RetryCounter> {
        Err(outage("get_retry_counter"))
    }

    async fn upsert_retry_counter(&self, _upsert: &RetryCounterUpsert) -> StorageResult<()> {
        Err(outage("upsert_retry_counter"))
    }

    async fn query_daily_retry_counters(
        &self,
        _card_id: &str,
        _merchant_id: &str,
    ) -> StorageResult<Vec<RetryCounter>> {
        Err(outage("query_daily_retry_counters"))
    }

    async fn delete_retry_counter(&self, _retry_key: &str) -> StorageResult<()> {
        Err(outage("delete_retry_counter"))
    }

    fn backend_name(&self) -> &'static str {
        "failing"
    }
}
