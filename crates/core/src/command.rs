//! Command envelopes and their decoding.
//!
//! Commands arrive as a transport record array with JSON bodies. Batch size 1
//! is a contract: only the first record is honored. Malformed payloads are
//! rejected here so the handlers downstream only ever see typed requests.

use crate::error::{Error, Result};
use crate::franchise::{Franchise, Operation};
use serde::{Deserialize, Serialize};

/// Delivered transport event wrapping one or more records.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransportEvent {
    #[serde(rename = "Records", default)]
    pub records: Vec<TransportRecord>,
}

impl TransportEvent {
    /// Wrap a single JSON body in an envelope; test and local-tooling helper.
    pub fn single(body: impl Into<String>) -> Self {
        Self {
            records: vec![TransportRecord { body: body.into() }],
        }
    }

    /// The only record this service honors.
    pub fn first_body(&self) -> Result<&str> {
        self.records
            .first()
            .map(|record| record.body.as_str())
            .ok_or_else(|| Error::MalformedCommand("empty record array".to_string()))
    }
}

/// One transport record carrying a JSON command body.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TransportRecord {
    #[serde(default)]
    pub body: String,
}

/// Command to block a card for a merchant or record a declined-transaction
/// retry against it.
///
/// `processor` is accepted and logged but never drives state.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RetryOrBlockRequest {
    #[serde(rename = "merchantIdentifier", default)]
    pub merchant_identifier: String,
    pub brand: Franchise,
    pub operation: Operation,
    #[serde(rename = "cardId", default)]
    pub card_id: String,
    #[serde(default)]
    pub processor: String,
    #[serde(default)]
    pub conditional: String,
}

/// Command to clear a (card, merchant) pair's daily retry accumulators.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RestoreDailyRequest {
    #[serde(rename = "cardId", default)]
    pub card_id: String,
    #[serde(rename = "merchantId", default)]
    pub merchant_id: String,
}

/// Synchronous status query from an authorizer.
///
/// `merchant_identifier` is optional at the type level so the HTTP layer can
/// reject its absence with a 400 instead of a deserialization failure.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusRequest {
    #[serde(rename = "cardId", default)]
    pub card_id: String,
    #[serde(rename = "merchantIdentifier")]
    pub merchant_identifier: Option<String>,
}

/// Status query result. The zero value means "not blocked, no retry
/// accumulation" and is also the fail-open answer on read errors.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusResponse {
    #[serde(rename = "blockType")]
    pub block_type: String,
    pub blocked: bool,
    #[serde(rename = "hasRetries")]
    pub has_retries: bool,
}

/// Decode the first record of an envelope as a retry/block command.
pub fn decode_retry_or_block(event: &TransportEvent) -> Result<RetryOrBlockRequest> {
    let body = event.first_body()?;
    serde_json::from_str(body).map_err(|e| Error::MalformedCommand(e.to_string()))
}

/// Decode the first record of an envelope as a restore-daily command.
pub fn decode_restore_daily(event: &TransportEvent) -> Result<RestoreDailyRequest> {
    let body = event.first_body()?;
    serde_json::from_str(body).map_err(|e| Error::MalformedCommand(e.to_string()))
}
