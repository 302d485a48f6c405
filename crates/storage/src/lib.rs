//! Typed key-value storage abstraction and backends for veto.
//!
//! This crate provides:
//! - The [`CardStore`] trait: conditional CRUD over blocked-card and
//!   retry-counter records with per-record optimistic concurrency
//! - Backends: DynamoDB and in-memory

pub mod backends;
pub mod error;
pub mod traits;

pub use backends::{dynamo::DynamoStore, memory::MemoryStore};
pub use error::{StorageError, StorageResult};
pub use traits::{CardStore, RetryCounterUpsert};

use std::sync::Arc;
use veto_core::config::StorageConfig;

/// Create a card store from configuration.
pub async fn from_config(config: &StorageConfig) -> StorageResult<Arc<dyn CardStore>> {
    config.validate().map_err(StorageError::Config)?;

    match config {
        StorageConfig::Dynamo {
            blocked_card_table,
            retry_table,
            region,
            endpoint,
        } => {
            let store = DynamoStore::new(
                blocked_card_table,
                retry_table,
                region.clone(),
                endpoint.clone(),
            )
            .await?;
            Ok(Arc::new(store))
        }
        StorageConfig::Memory => Ok(Arc::new(MemoryStore::new())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn from_config_memory_ok() {
        let store = from_config(&StorageConfig::Memory).await.unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[tokio::test]
    async fn from_config_rejects_missing_table_names() {
        let config = StorageConfig::Dynamo {
            blocked_card_table: String::new(),
            retry_table: String::new(),
            region: None,
            endpoint: None,
        };
        match from_config(&config).await {
            Err(StorageError::Config(_)) => {}
            Err(other) => panic!("unexpected error: {other:?}"),
            Ok(_) => panic!("unexpected result: Ok"),
        }
    }
}
