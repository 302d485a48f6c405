//! Restore pipeline: clears a (card, merchant) pair's daily accumulators.
//!
//! Deletes every daily retry counter for the pair and resets the merchant's
//! `lastRetry` to zero. Monthly counters, PERMANENT blocks and unexpired
//! TEMPORARY blocks are untouched.

use crate::error::EngineResult;
use std::sync::Arc;
use tracing::info;
use veto_core::command::{self, RestoreDailyRequest, TransportEvent};
use veto_core::{Clock, bump_version};
use veto_storage::CardStore;

/// Command handler for scheduled daily-retry restores.
pub struct RestorePipeline {
    store: Arc<dyn CardStore>,
    clock: Arc<dyn Clock>,
}

impl RestorePipeline {
    pub fn new(store: Arc<dyn CardStore>, clock: Arc<dyn Clock>) -> Self {
        Self { store, clock }
    }

    /// Decode and process one transport delivery.
    pub async fn handle(&self, event: &TransportEvent) -> EngineResult<()> {
        let request = command::decode_restore_daily(event)?;
        self.restore(&request).await
    }

    /// Process a typed restore command.
    pub async fn restore(&self, request: &RestoreDailyRequest) -> EngineResult<()> {
        self.clean_daily_retries(request).await?;
        self.clean_last_retry(request).await
    }

    async fn clean_daily_retries(&self, request: &RestoreDailyRequest) -> EngineResult<()> {
        let counters = self
            .store
            .query_daily_retry_counters(&request.card_id, &request.merchant_id)
            .await?;

        for counter in &counters {
            self.store.delete_retry_counter(&counter.retry_key).await?;
        }

        info!(
            card_id = %request.card_id,
            merchant_id = %request.merchant_id,
            deleted = counters.len(),
            "daily retry counters cleared"
        );
        Ok(())
    }

    /// Reset the merchant's lastRetry, preserving its block state. A missing
    /// blocked-card record fails the command.
    async fn clean_last_retry(&self, request: &RestoreDailyRequest) -> EngineResult<()> {
        let card = self.store.get_blocked_card(&request.card_id).await?;

        let mut merchant = card
            .blocked_merchants
            .get(&request.merchant_id)
            .cloned()
            .unwrap_or_default();
        merchant.last_retry = 0;

        let now = self.clock.now_ms();
        self.store
            .update_blocked_card_merchant(
                &request.card_id,
                &request.merchant_id,
                &merchant,
                card.time_stamp,
                bump_version(now, card.time_stamp),
            )
            .await?;

        info!(
            card_id = %request.card_id,
            merchant_id = %request.merchant_id,
            "lastRetry cleared"
        );
        Ok(())
    }
}
