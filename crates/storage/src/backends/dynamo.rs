//! DynamoDB storage backend using the AWS SDK.
//!
//! Two tables back the store: a blocked-card table keyed by `cardID` and a
//! retry-counter table keyed by `retryKey` with a `(cardID, merchantID)`
//! secondary index. Optimistic concurrency is expressed through condition
//! expressions; a `ConditionalCheckFailedException` surfaces as the typed
//! conflict variant instead of a generic transport failure.

use crate::error::{StorageError, StorageResult};
use crate::traits::{CardStore, RetryCounterUpsert};
use async_trait::async_trait;
use aws_config::BehaviorVersion;
use aws_sdk_dynamodb::Client;
use aws_sdk_dynamodb::types::AttributeValue;
use std::collections::HashMap;
use tracing::instrument;
use veto_core::{BlockedCard, BlockedMerchant, RetryCounter};

/// Secondary index on the retry-counter table over (cardID, merchantID).
const CARD_MERCHANT_INDEX: &str = "cardIdMerchantIndex";

/// Substring identifying daily counters in a retry key.
const DAILY_MARKER: &str = "daily";

/// DynamoDB-backed card store.
pub struct DynamoStore {
    client: Client,
    blocked_card_table: String,
    retry_table: String,
}

impl std::fmt::Debug for DynamoStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DynamoStore")
            .field("blocked_card_table", &self.blocked_card_table)
            .field("retry_table", &self.retry_table)
            .finish_non_exhaustive()
    }
}

impl DynamoStore {
    /// Create a new DynamoDB store from the ambient AWS configuration.
    ///
    /// # Arguments
    /// * `region` - Overrides the ambient region when set.
    /// * `endpoint` - Endpoint URL override for DynamoDB Local or gateways.
    pub async fn new(
        blocked_card_table: &str,
        retry_table: &str,
        region: Option<String>,
        endpoint: Option<String>,
    ) -> StorageResult<Self> {
        if blocked_card_table.is_empty() || retry_table.is_empty() {
            return Err(StorageError::Config(
                "dynamo store requires both table names".to_string(),
            ));
        }

        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = region {
            loader = loader.region(aws_config::Region::new(region));
        }
        let shared = loader.load().await;

        let mut builder = aws_sdk_dynamodb::config::Builder::from(&shared);
        if let Some(endpoint) = endpoint {
            builder = builder.endpoint_url(endpoint);
        }

        Ok(Self::with_client(
            Client::from_conf(builder.build()),
            blocked_card_table,
            retry_table,
        ))
    }

    /// Wrap an already-configured client; the seam used by integration
    /// tests pointed at DynamoDB Local.
    pub fn with_client(client: Client, blocked_card_table: &str, retry_table: &str) -> Self {
        Self {
            client,
            blocked_card_table: blocked_card_table.to_string(),
            retry_table: retry_table.to_string(),
        }
    }
}

#[async_trait]
impl CardStore for DynamoStore {
    #[instrument(skip(self), level = "debug")]
    async fn get_blocked_card(&self, card_id: &str) -> StorageResult<BlockedCard> {
        let output = self
            .client
            .get_item()
            .table_name(&self.blocked_card_table)
            .key("cardID", attr_s(card_id))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(Box::new(e)))?;

        match output.item {
            Some(item) => Ok(parse_blocked_card(&item)),
            None => Err(StorageError::NotFound(format!("blocked card {card_id}"))),
        }
    }

    #[instrument(skip(self, card), fields(card_id = %card.card_id), level = "debug")]
    async fn put_blocked_card(&self, card: &BlockedCard) -> StorageResult<()> {
        let result = self
            .client
            .put_item()
            .table_name(&self.blocked_card_table)
            .set_item(Some(blocked_card_item(card)))
            .condition_expression("attribute_not_exists(cardID)")
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let service = e.into_service_error();
                if service.is_conditional_check_failed_exception() {
                    Err(StorageError::AlreadyExists(format!(
                        "blocked card {}",
                        card.card_id
                    )))
                } else {
                    Err(StorageError::Unavailable(Box::new(service)))
                }
            }
        }
    }

    #[instrument(skip(self, merchant), level = "debug")]
    async fn update_blocked_card_merchant(
        &self,
        card_id: &str,
        merchant_id: &str,
        merchant: &BlockedMerchant,
        expected_version: i64,
        new_version: i64,
    ) -> StorageResult<()> {
        let result = self
            .client
            .update_item()
            .table_name(&self.blocked_card_table)
            .key("cardID", attr_s(card_id))
            .update_expression("SET #merchants.#merchant = :merchant, #version = :version")
            .condition_expression("#version = :expected")
            .expression_attribute_names("#merchants", "blockedMerchants")
            .expression_attribute_names("#merchant", merchant_id)
            .expression_attribute_names("#version", "timeStamp")
            .expression_attribute_values(":merchant", AttributeValue::M(merchant_attr(merchant)))
            .expression_attribute_values(":version", attr_n(new_version))
            .expression_attribute_values(":expected", attr_n(expected_version))
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let service = e.into_service_error();
                if service.is_conditional_check_failed_exception() {
                    Err(StorageError::PreconditionFailed(format!(
                        "blocked card {card_id} expected version {expected_version}"
                    )))
                } else {
                    Err(StorageError::Unavailable(Box::new(service)))
                }
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn get_retry_counter(&self, retry_key: &str) -> StorageResult<RetryCounter> {
        let output = self
            .client
            .get_item()
            .table_name(&self.retry_table)
            .key("retryKey", attr_s(retry_key))
            .consistent_read(true)
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(Box::new(e)))?;

        match output.item {
            Some(item) => Ok(parse_retry_counter(&item)),
            None => Err(StorageError::NotFound(format!("retry counter {retry_key}"))),
        }
    }

    #[instrument(skip(self, upsert), fields(retry_key = %upsert.retry_key), level = "debug")]
    async fn upsert_retry_counter(&self, upsert: &RetryCounterUpsert) -> StorageResult<()> {
        let retries = upsert.retries.iter().map(|&retry| attr_n(retry)).collect();

        let result = self
            .client
            .update_item()
            .table_name(&self.retry_table)
            .key("retryKey", attr_s(&upsert.retry_key))
            .update_expression(
                "SET #version = :version, #retries = :retries, \
                 #card = if_not_exists(#card, :card), \
                 #merchant = if_not_exists(#merchant, :merchant)",
            )
            // First write: the version attribute does not exist yet.
            .condition_expression("attribute_not_exists(#version) OR #version = :expected")
            .expression_attribute_names("#version", "timeStamp")
            .expression_attribute_names("#retries", "retries")
            .expression_attribute_names("#card", "cardID")
            .expression_attribute_names("#merchant", "merchantID")
            .expression_attribute_values(":version", attr_n(upsert.new_version))
            .expression_attribute_values(":retries", AttributeValue::L(retries))
            .expression_attribute_values(":card", attr_s(&upsert.card_id))
            .expression_attribute_values(":merchant", attr_s(&upsert.merchant_id))
            .expression_attribute_values(
                ":expected",
                attr_n(upsert.expected_version.unwrap_or_default()),
            )
            .send()
            .await;

        match result {
            Ok(_) => Ok(()),
            Err(e) => {
                let service = e.into_service_error();
                if service.is_conditional_check_failed_exception() {
                    Err(StorageError::PreconditionFailed(format!(
                        "retry counter {} expected version {:?}",
                        upsert.retry_key, upsert.expected_version
                    )))
                } else {
                    Err(StorageError::Unavailable(Box::new(service)))
                }
            }
        }
    }

    #[instrument(skip(self), level = "debug")]
    async fn query_daily_retry_counters(
        &self,
        card_id: &str,
        merchant_id: &str,
    ) -> StorageResult<Vec<RetryCounter>> {
        let mut counters = Vec::new();
        let mut start_key = None;

        loop {
            let output = self
                .client
                .query()
                .table_name(&self.retry_table)
                .index_name(CARD_MERCHANT_INDEX)
                .key_condition_expression("#card = :card AND #merchant = :merchant")
                .filter_expression("contains(#key, :daily)")
                .expression_attribute_names("#card", "cardID")
                .expression_attribute_names("#merchant", "merchantID")
                .expression_attribute_names("#key", "retryKey")
                .expression_attribute_values(":card", attr_s(card_id))
                .expression_attribute_values(":merchant", attr_s(merchant_id))
                .expression_attribute_values(":daily", attr_s(DAILY_MARKER))
                .set_exclusive_start_key(start_key)
                .send()
                .await
                .map_err(|e| StorageError::Unavailable(Box::new(e)))?;

            counters.extend(output.items().iter().map(parse_retry_counter));

            start_key = output.last_evaluated_key.clone();
            if start_key.is_none() {
                break;
            }
        }

        Ok(counters)
    }

    #[instrument(skip(self), level = "debug")]
    async fn delete_retry_counter(&self, retry_key: &str) -> StorageResult<()> {
        self.client
            .delete_item()
            .table_name(&self.retry_table)
            .key("retryKey", attr_s(retry_key))
            .send()
            .await
            .map_err(|e| StorageError::Unavailable(Box::new(e)))?;
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "dynamo"
    }

    async fn health_check(&self) -> StorageResult<()> {
        for table in [&self.blocked_card_table, &self.retry_table] {
            self.client
                .describe_table()
                .table_name(table)
                .send()
                .await
                .map_err(|e| StorageError::Unavailable(Box::new(e)))?;
        }
        Ok(())
    }
}

// ===== Attribute marshalling =====

fn attr_s(value: &str) -> AttributeValue {
    AttributeValue::S(value.to_string())
}

fn attr_n(value: i64) -> AttributeValue {
    AttributeValue::N(value.to_string())
}

fn read_s(item: &HashMap<String, AttributeValue>, name: &str) -> String {
    item.get(name)
        .and_then(|value| value.as_s().ok())
        .cloned()
        .unwrap_or_default()
}

fn read_n(item: &HashMap<String, AttributeValue>, name: &str) -> i64 {
    item.get(name)
        .and_then(|value| value.as_n().ok())
        .and_then(|raw| raw.parse().ok())
        .unwrap_or_default()
}

fn blocked_card_item(card: &BlockedCard) -> HashMap<String, AttributeValue> {
    let merchants = card
        .blocked_merchants
        .iter()
        .map(|(merchant_id, merchant)| {
            (merchant_id.clone(), AttributeValue::M(merchant_attr(merchant)))
        })
        .collect();

    HashMap::from([
        ("cardID".to_string(), attr_s(&card.card_id)),
        ("timeStamp".to_string(), attr_n(card.time_stamp)),
        ("blockedMerchants".to_string(), AttributeValue::M(merchants)),
    ])
}

fn merchant_attr(merchant: &BlockedMerchant) -> HashMap<String, AttributeValue> {
    HashMap::from([
        (
            "expirationDate".to_string(),
            attr_n(merchant.expiration_date),
        ),
        ("blockType".to_string(), attr_s(&merchant.block_type)),
        ("lastRetry".to_string(), attr_n(merchant.last_retry)),
    ])
}

fn parse_blocked_card(item: &HashMap<String, AttributeValue>) -> BlockedCard {
    let blocked_merchants = item
        .get("blockedMerchants")
        .and_then(|value| value.as_m().ok())
        .map(|merchants| {
            merchants
                .iter()
                .filter_map(|(merchant_id, value)| {
                    value
                        .as_m()
                        .ok()
                        .map(|attrs| (merchant_id.clone(), parse_merchant(attrs)))
                })
                .collect()
        })
        .unwrap_or_default();

    BlockedCard {
        card_id: read_s(item, "cardID"),
        time_stamp: read_n(item, "timeStamp"),
        blocked_merchants,
    }
}

fn parse_merchant(attrs: &HashMap<String, AttributeValue>) -> BlockedMerchant {
    BlockedMerchant {
        expiration_date: read_n(attrs, "expirationDate"),
        block_type: read_s(attrs, "blockType"),
        last_retry: read_n(attrs, "lastRetry"),
    }
}

fn parse_retry_counter(item: &HashMap<String, AttributeValue>) -> RetryCounter {
    let retries = item
        .get("retries")
        .and_then(|value| value.as_l().ok())
        .map(|values| {
            values
                .iter()
                .filter_map(|value| value.as_n().ok())
                .filter_map(|raw| raw.parse().ok())
                .collect()
        })
        .unwrap_or_default();

    RetryCounter {
        retry_key: read_s(item, "retryKey"),
        card_id: read_s(item, "cardID"),
        merchant_id: read_s(item, "merchantID"),
        retries,
        time_stamp: read_n(item, "timeStamp"),
    }
}
