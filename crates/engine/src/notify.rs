//! Error-notification bridge.
//!
//! The external error tracker is specified only by the contract it presents
//! to the core: [`ErrorNotifier`]. The Rollbar client implements it over the
//! items API; the log-only fallback keeps deployments without a token
//! working.
//!
//! Notification is best-effort. A tracker outage must never fail the command
//! that triggered it, so failures are logged and swallowed here.

use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, warn};
use veto_core::config::ObservabilityConfig;

/// Sink for error notifications emitted by the dead-letter handler.
#[async_trait]
pub trait ErrorNotifier: Send + Sync + 'static {
    async fn notify(&self, message: &str);
}

/// Fallback notifier: structured log only.
pub struct LogNotifier;

#[async_trait]
impl ErrorNotifier for LogNotifier {
    async fn notify(&self, message: &str) {
        error!(message = %message, "error notification (no tracker configured)");
    }
}

/// Rollbar items-API client.
pub struct RollbarNotifier {
    http: reqwest::Client,
    base_url: String,
    token: String,
    environment: String,
    code_version: Option<String>,
}

impl RollbarNotifier {
    pub fn new(token: &str, environment: &str, code_version: Option<String>) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: "https://api.rollbar.com".to_string(),
            token: token.to_string(),
            environment: environment.to_string(),
            code_version,
        }
    }

    /// Override the API base URL; test seam.
    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }
}

#[async_trait]
impl ErrorNotifier for RollbarNotifier {
    async fn notify(&self, message: &str) {
        let item = serde_json::json!({
            "access_token": self.token,
            "data": {
                "environment": self.environment,
                "level": "error",
                "code_version": self.code_version,
                "body": { "message": { "body": message } },
            }
        });

        let result = self
            .http
            .post(format!("{}/api/1/item/", self.base_url))
            .json(&item)
            .send()
            .await;

        match result {
            Ok(response) if !response.status().is_success() => {
                warn!(status = %response.status(), "error tracker rejected notification");
            }
            Ok(_) => {}
            Err(e) => {
                warn!(error = %e, "failed to reach error tracker");
            }
        }
    }
}

/// Build the configured notifier: Rollbar when a token is present, log-only
/// otherwise.
pub fn from_config(config: &ObservabilityConfig) -> Arc<dyn ErrorNotifier> {
    match &config.rollbar_token {
        Some(token) => Arc::new(RollbarNotifier::new(
            token,
            &config.stage,
            config.commit.clone(),
        )),
        None => Arc::new(LogNotifier),
    }
}
