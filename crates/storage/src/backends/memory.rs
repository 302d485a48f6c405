//! In-memory storage backend.
//!
//! Implements the same conditional-write semantics as the DynamoDB backend
//! over process-local maps. Used by unit and integration tests and by local
//! runs without AWS access.

use crate::error::{StorageError, StorageResult};
use crate::traits::{CardStore, RetryCounterUpsert};
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::Mutex;
use veto_core::{BlockedCard, BlockedMerchant, RetryCounter};

#[derive(Default)]
struct Tables {
    cards: HashMap<String, BlockedCard>,
    counters: HashMap<String, RetryCounter>,
}

/// Card store over in-process hash maps.
#[derive(Default)]
pub struct MemoryStore {
    tables: Mutex<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot a blocked-card record without NotFound mapping; test helper.
    pub async fn blocked_card(&self, card_id: &str) -> Option<BlockedCard> {
        self.tables.lock().await.cards.get(card_id).cloned()
    }

    /// Snapshot a retry counter; test helper.
    pub async fn retry_counter(&self, retry_key: &str) -> Option<RetryCounter> {
        self.tables.lock().await.counters.get(retry_key).cloned()
    }

    /// Seed a blocked-card record, bypassing the create-only condition.
    pub async fn seed_blocked_card(&self, card: BlockedCard) {
        self.tables
            .lock()
            .await
            .cards
            .insert(card.card_id.clone(), card);
    }

    /// Seed a retry counter.
    pub async fn seed_retry_counter(&self, counter: RetryCounter) {
        self.tables
            .lock()
            .await
            .counters
            .insert(counter.retry_key.clone(), counter);
    }

    /// Number of retry counters currently stored; test helper.
    pub async fn retry_counter_count(&self) -> usize {
        self.tables.lock().await.counters.len()
    }
}

#[async_trait]
impl CardStore for MemoryStore {
    async fn get_blocked_card(&self, card_id: &str) -> StorageResult<BlockedCard> {
        self.tables
            .lock()
            .await
            .cards
            .get(card_id)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("blocked card {card_id}")))
    }

    async fn put_blocked_card(&self, card: &BlockedCard) -> StorageResult<()> {
        let mut tables = self.tables.lock().await;
        if tables.cards.contains_key(&card.card_id) {
            return Err(StorageError::AlreadyExists(format!(
                "blocked card {}",
                card.card_id
            )));
        }
        tables.cards.insert(card.card_id.clone(), card.clone());
        Ok(())
    }

    async fn update_blocked_card_merchant(
        &self,
        card_id: &str,
        merchant_id: &str,
        merchant: &BlockedMerchant,
        expected_version: i64,
        new_version: i64,
    ) -> StorageResult<()> {
        let mut tables = self.tables.lock().await;
        let card = tables
            .cards
            .get_mut(card_id)
            .ok_or_else(|| StorageError::NotFound(format!("blocked card {card_id}")))?;

        if card.time_stamp != expected_version {
            return Err(StorageError::PreconditionFailed(format!(
                "blocked card {card_id} expected version {expected_version}, stored {}",
                card.time_stamp
            )));
        }

        card.blocked_merchants
            .insert(merchant_id.to_string(), merchant.clone());
        card.time_stamp = new_version;
        Ok(())
    }

    async fn get_retry_counter(&self, retry_key: &str) -> StorageResult<RetryCounter> {
        self.tables
            .lock()
            .await
            .counters
            .get(retry_key)
            .cloned()
            .ok_or_else(|| StorageError::NotFound(format!("retry counter {retry_key}")))
    }

    async fn upsert_retry_counter(&self, upsert: &RetryCounterUpsert) -> StorageResult<()> {
        let mut tables = self.tables.lock().await;
        match tables.counters.get_mut(&upsert.retry_key) {
            Some(counter) => {
                if upsert.expected_version != Some(counter.time_stamp) {
                    return Err(StorageError::PreconditionFailed(format!(
                        "retry counter {} expected version {:?}, stored {}",
                        upsert.retry_key, upsert.expected_version, counter.time_stamp
                    )));
                }
                counter.retries = upsert.retries.clone();
                counter.time_stamp = upsert.new_version;
                Ok(())
            }
            None => {
                tables.counters.insert(
                    upsert.retry_key.clone(),
                    RetryCounter {
                        retry_key: upsert.retry_key.clone(),
                        card_id: upsert.card_id.clone(),
                        merchant_id: upsert.merchant_id.clone(),
                        retries: upsert.retries.clone(),
                        time_stamp: upsert.new_version,
                    },
                );
                Ok(())
            }
        }
    }

    async fn query_daily_retry_counters(
        &self,
        card_id: &str,
        merchant_id: &str,
    ) -> StorageResult<Vec<RetryCounter>> {
        let tables = self.tables.lock().await;
        let mut counters: Vec<RetryCounter> = tables
            .counters
            .values()
            .filter(|counter| {
                counter.card_id == card_id
                    && counter.merchant_id == merchant_id
                    && counter.retry_key.contains("daily")
            })
            .cloned()
            .collect();
        counters.sort_by(|a, b| a.retry_key.cmp(&b.retry_key));
        Ok(counters)
    }

    async fn delete_retry_counter(&self, retry_key: &str) -> StorageResult<()> {
        self.tables.lock().await.counters.remove(retry_key);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
