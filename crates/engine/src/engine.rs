//! Retry & block engine.
//!
//! Consumes retry/block commands one at a time. Per command: load (or
//! create) the blocked-card record, then either apply an administrative
//! PERMANENT block, or roll the franchise's retry counters forward and apply
//! a TEMPORARY block when any quota overflows.
//!
//! `now` is sampled once at command entry; every window, expiry and version
//! written by the command derives from that sample.

use crate::error::EngineResult;
use crate::metrics;
use std::sync::Arc;
use tracing::{debug, info};
use veto_core::command::{self, RetryOrBlockRequest, TransportEvent};
use veto_core::{
    BlockType, BlockedCard, Clock, Frequency, Operation, bump_version, window,
};
use veto_storage::{CardStore, RetryCounterUpsert, StorageError};

/// Command handler for retry and block commands.
pub struct BlockEngine {
    store: Arc<dyn CardStore>,
    clock: Arc<dyn Clock>,
}

impl BlockEngine {
    pub fn new(store: Arc<dyn CardStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Decode and process one transport delivery.
    pub async fn handle(&self, event: &TransportEvent) -> EngineResult<()> {
        let request = command::decode_retry_or_block(event)?;
        self.process(&request).await
    }

    /// Process a typed retry/block command.
    pub async fn process(&self, request: &RetryOrBlockRequest) -> EngineResult<()> {
        if request.card_id.is_empty() {
            info!("empty cardID, skipping command");
            return Ok(());
        }

        let now = self.clock.now_ms();
        let card = self.load_or_create_card(&request.card_id, now).await?;

        match request.operation {
            Operation::Block => {
                info!(
                    card_id = %request.card_id,
                    merchant_id = %request.merchant_identifier,
                    "applying administrative block"
                );
                self.apply_block(&card, &request.merchant_identifier, BlockType::Permanent, now)
                    .await
            }
            Operation::Retry => self.process_retries(request, &card, now).await,
        }
    }

    async fn process_retries(
        &self,
        request: &RetryOrBlockRequest,
        card: &BlockedCard,
        now: i64,
    ) -> EngineResult<()> {
        debug!(
            card_id = %request.card_id,
            merchant_id = %request.merchant_identifier,
            brand = %request.brand,
            processor = %request.processor,
            "checking retry quotas"
        );

        let mut overflowed = false;
        for &frequency in request.brand.frequencies() {
            overflowed |= self.record_retry(request, frequency, now).await?;
        }

        if overflowed {
            info!(
                card_id = %request.card_id,
                merchant_id = %request.merchant_identifier,
                brand = %request.brand,
                "retries exceeded quota, blocking card"
            );
            return self
                .apply_block(card, &request.merchant_identifier, BlockType::Temporary, now)
                .await;
        }

        // Visa tracks no daily retries; only MasterCard records lastRetry on
        // the non-overflow path.
        if !request.brand.tracks_last_retry() {
            return Ok(());
        }
        self.update_last_retry(card, &request.merchant_identifier, now)
            .await
    }

    /// Roll one frequency's counter forward. Returns whether the pruned list
    /// reached the franchise quota.
    async fn record_retry(
        &self,
        request: &RetryOrBlockRequest,
        frequency: Frequency,
        now: i64,
    ) -> EngineResult<bool> {
        let retry_key = request.brand.retry_key(
            &request.card_id,
            &request.merchant_identifier,
            &request.conditional,
            frequency,
        );

        let existing = match self.store.get_retry_counter(&retry_key).await {
            Ok(counter) => Some(counter),
            Err(StorageError::NotFound(_)) => None,
            Err(e) => return Err(e.into()),
        };

        let observed = existing.as_ref().map(|counter| counter.time_stamp);
        let prior = existing
            .as_ref()
            .map(|counter| counter.retries.as_slice())
            .unwrap_or_default();
        let retries = window::prune_retries(now, prior, frequency);
        let count = retries.len();

        self.store
            .upsert_retry_counter(&RetryCounterUpsert {
                retry_key: retry_key.clone(),
                card_id: request.card_id.clone(),
                merchant_id: request.merchant_identifier.clone(),
                retries,
                expected_version: observed,
                new_version: bump_version(now, observed.unwrap_or_default()),
            })
            .await?;

        debug!(retry_key = %retry_key, count, "retry counter rolled forward");
        Ok(count >= request.brand.limit(frequency))
    }

    /// Load the card's record, creating it on first reference. A create
    /// conflict means a concurrent writer won the race; reload.
    async fn load_or_create_card(&self, card_id: &str, now: i64) -> EngineResult<BlockedCard> {
        match self.store.get_blocked_card(card_id).await {
            Ok(card) => Ok(card),
            Err(StorageError::NotFound(_)) => {
                info!(card_id = %card_id, "no blocked-card record, creating");
                let card = BlockedCard {
                    card_id: card_id.to_string(),
                    time_stamp: now,
                    blocked_merchants: Default::default(),
                };
                match self.store.put_blocked_card(&card).await {
                    Ok(()) => Ok(card),
                    Err(StorageError::AlreadyExists(_)) => {
                        debug!(card_id = %card_id, "lost creation race, reloading");
                        Ok(self.store.get_blocked_card(card_id).await?)
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Write the merchant's block state, preserving its recorded lastRetry.
    /// PERMANENT blocks also carry the 24 h expiry for wire compatibility;
    /// the evaluator ignores it.
    async fn apply_block(
        &self,
        card: &BlockedCard,
        merchant_id: &str,
        block_type: BlockType,
        now: i64,
    ) -> EngineResult<()> {
        let mut merchant = card
            .blocked_merchants
            .get(merchant_id)
            .cloned()
            .unwrap_or_default();
        merchant.block_type = block_type.as_str().to_string();
        merchant.expiration_date = window::temporary_block_expiry(now);

        self.store
            .update_blocked_card_merchant(
                &card.card_id,
                merchant_id,
                &merchant,
                card.time_stamp,
                bump_version(now, card.time_stamp),
            )
            .await?;

        metrics::BLOCKS_APPLIED
            .with_label_values(&[block_type.as_str()])
            .inc();
        info!(
            card_id = %card.card_id,
            merchant_id = %merchant_id,
            block_type = %block_type,
            "card blocked for merchant"
        );
        Ok(())
    }

    /// Record the retry event on the merchant entry, preserving any block
    /// state already there.
    async fn update_last_retry(
        &self,
        card: &BlockedCard,
        merchant_id: &str,
        now: i64,
    ) -> EngineResult<()> {
        let mut merchant = card
            .blocked_merchants
            .get(merchant_id)
            .cloned()
            .unwrap_or_default();
        merchant.last_retry = now;

        self.store
            .update_blocked_card_merchant(
                &card.card_id,
                merchant_id,
                &merchant,
                card.time_stamp,
                bump_version(now, card.time_stamp),
            )
            .await?;

        debug!(card_id = %card.card_id, merchant_id = %merchant_id, "lastRetry updated");
        Ok(())
    }
}
