//! Configuration types shared across crates.

use serde::{Deserialize, Serialize};

/// Top-level application configuration.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl AppConfig {
    /// Configuration for tests: in-memory storage, no external notifier.
    pub fn for_testing() -> Self {
        Self {
            server: ServerConfig::default(),
            storage: StorageConfig::Memory,
            observability: ObservabilityConfig::default(),
        }
    }
}

/// HTTP server configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Bind address (e.g., "0.0.0.0:8080").
    #[serde(default = "default_bind")]
    pub bind: String,
    /// Enable the /metrics endpoint for Prometheus scraping (default: true).
    #[serde(default = "default_metrics_enabled")]
    pub metrics_enabled: bool,
}

fn default_bind() -> String {
    "127.0.0.1:8080".to_string()
}

fn default_metrics_enabled() -> bool {
    true
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
            metrics_enabled: default_metrics_enabled(),
        }
    }
}

/// Storage backend configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum StorageConfig {
    /// DynamoDB-backed tables.
    Dynamo {
        /// Blocked-card table name.
        blocked_card_table: String,
        /// Retry-counter table name.
        retry_table: String,
        /// AWS region. Falls back to the ambient AWS configuration.
        region: Option<String>,
        /// Optional endpoint URL (for DynamoDB Local, etc.).
        endpoint: Option<String>,
    },
    /// In-memory store for tests and local runs.
    Memory,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self::Memory
    }
}

impl StorageConfig {
    /// Validate the configuration, returning an error message on failure.
    pub fn validate(&self) -> Result<(), String> {
        match self {
            Self::Dynamo {
                blocked_card_table,
                retry_table,
                ..
            } => {
                if blocked_card_table.is_empty() {
                    return Err("dynamo config requires blocked_card_table".to_string());
                }
                if retry_table.is_empty() {
                    return Err("dynamo config requires retry_table".to_string());
                }
                Ok(())
            }
            Self::Memory => Ok(()),
        }
    }
}

/// Error-tracker and deployment metadata.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Rollbar access token. When unset, dead-letter notifications only log.
    #[serde(default)]
    pub rollbar_token: Option<String>,
    /// Deployment stage reported to the error tracker.
    #[serde(default = "default_stage")]
    pub stage: String,
    /// Deployed commit reported to the error tracker.
    #[serde(default)]
    pub commit: Option<String>,
}

fn default_stage() -> String {
    "local".to_string()
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            rollbar_token: None,
            stage: default_stage(),
            commit: None,
        }
    }
}
