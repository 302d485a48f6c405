//! Dead-letter sink.
//!
//! Terminal consumer for retry/block commands the transport gave up on:
//! parse, log, notify, acknowledge. No state changes and no recovery writes
//! happen here.

use crate::error::EngineResult;
use crate::notify::ErrorNotifier;
use serde::Deserialize;
use std::sync::Arc;
use tracing::error;
use veto_core::Error;
use veto_core::command::TransportEvent;

/// Lenient view of a dead-lettered retry/block payload. The brand stays a
/// raw string: a payload dead-lettered for being malformed must still be
/// reportable.
#[derive(Debug, Deserialize)]
struct DeadLetterPayload {
    #[serde(default)]
    brand: String,
    #[serde(rename = "cardId", default)]
    card_id: String,
}

/// Handler for dead-letter deliveries.
pub struct DeadLetterSink {
    notifier: Arc<dyn ErrorNotifier>,
}

impl DeadLetterSink {
    pub fn new(notifier: Arc<dyn ErrorNotifier>) -> Self {
        Self { notifier }
    }

    /// Report one exhausted command and acknowledge it.
    pub async fn handle(&self, event: &TransportEvent) -> EngineResult<()> {
        let body = event.first_body()?;
        let payload: DeadLetterPayload = serde_json::from_str(body)
            .map_err(|e| Error::MalformedCommand(e.to_string()))?;

        error!(
            brand = %payload.brand,
            card_id = %payload.card_id,
            "card block command exhausted transport retries"
        );

        let message = format!(
            "card block failed for brand {} card {}",
            payload.brand, payload.card_id
        );
        self.notifier.notify(&message).await;

        Ok(())
    }
}
