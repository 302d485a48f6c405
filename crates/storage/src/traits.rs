//! Storage trait definitions.

use crate::error::StorageResult;
use async_trait::async_trait;
use veto_core::{BlockedCard, BlockedMerchant, RetryCounter};

/// Conditional upsert of a retry counter.
///
/// `card_id` and `merchant_id` are written only on first creation; the
/// backend preserves existing values on subsequent writes. `expected_version`
/// is `None` when the caller observed no record: the write then succeeds only
/// while the version attribute is still absent or matches a concurrent first
/// write's expectation.
#[derive(Clone, Debug)]
pub struct RetryCounterUpsert {
    pub retry_key: String,
    pub card_id: String,
    pub merchant_id: String,
    /// Pruned retry list replacing the stored one.
    pub retries: Vec<i64>,
    pub expected_version: Option<i64>,
    pub new_version: i64,
}

/// Typed CRUD over the two card-control record families.
///
/// All writes are optimistic: they carry the version observed when the record
/// was read in the current command and fail with
/// [`StorageError::PreconditionFailed`](crate::StorageError::PreconditionFailed)
/// when the store has moved on. Reads are strongly consistent where the
/// backend supports it.
#[async_trait]
pub trait CardStore: Send + Sync + 'static {
    /// Fetch a blocked-card record. `NotFound` when the card has no record.
    async fn get_blocked_card(&self, card_id: &str) -> StorageResult<BlockedCard>;

    /// Create a blocked-card record. `AlreadyExists` when a concurrent
    /// writer created it first.
    async fn put_blocked_card(&self, card: &BlockedCard) -> StorageResult<()>;

    /// Replace one merchant entry inside a blocked-card record and bump the
    /// record version, guarded on `expected_version`.
    async fn update_blocked_card_merchant(
        &self,
        card_id: &str,
        merchant_id: &str,
        merchant: &BlockedMerchant,
        expected_version: i64,
        new_version: i64,
    ) -> StorageResult<()>;

    /// Fetch a retry counter by its composed key.
    async fn get_retry_counter(&self, retry_key: &str) -> StorageResult<RetryCounter>;

    /// Conditionally upsert a retry counter; see [`RetryCounterUpsert`].
    async fn upsert_retry_counter(&self, upsert: &RetryCounterUpsert) -> StorageResult<()>;

    /// Secondary lookup of a (card, merchant) pair's counters, filtered to
    /// retry keys containing `"daily"`.
    async fn query_daily_retry_counters(
        &self,
        card_id: &str,
        merchant_id: &str,
    ) -> StorageResult<Vec<RetryCounter>>;

    /// Delete a retry counter. Deleting an absent key is not an error.
    async fn delete_retry_counter(&self, retry_key: &str) -> StorageResult<()>;

    /// Static identifier for metrics and logging (e.g., "dynamo", "memory").
    fn backend_name(&self) -> &'static str;

    /// Verify backend connectivity at startup. The default implementation
    /// returns Ok(()), suitable for backends without a remote dependency.
    async fn health_check(&self) -> StorageResult<()> {
        Ok(())
    }
}
