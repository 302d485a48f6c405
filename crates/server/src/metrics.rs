//! Prometheus metrics for the veto server.
//!
//! The `/metrics` endpoint is unauthenticated to allow Prometheus scraping
//! and carries no card or merchant identifiers. Restrict it to authorized
//! scraper networks at the infrastructure level.

use axum::http::StatusCode;
use axum::response::IntoResponse;
use prometheus::{
    Encoder, HistogramOpts, HistogramVec, IntCounter, IntCounterVec, Opts, Registry, TextEncoder,
};
use std::sync::{LazyLock, Once};

// Counters owned by the engine crate, incremented where the signal
// originates; re-exported and registered here for scraping.
pub use veto_engine::metrics::{BLOCKS_APPLIED, FAILOPEN_READS};

/// Global Prometheus registry for all metrics.
pub static REGISTRY: LazyLock<Registry> = LazyLock::new(Registry::new);

pub static COMMANDS_PROCESSED: LazyLock<IntCounterVec> = LazyLock::new(|| {
    IntCounterVec::new(
        Opts::new(
            "veto_commands_processed_total",
            "Commands processed by handler and outcome",
        ),
        &["handler", "outcome"],
    )
    .expect("metric creation failed")
});

pub static COMMAND_DURATION: LazyLock<HistogramVec> = LazyLock::new(|| {
    HistogramVec::new(
        HistogramOpts::new(
            "veto_command_duration_seconds",
            "Command processing duration by handler",
        )
        .buckets(vec![0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0, 2.5]),
        &["handler"],
    )
    .expect("metric creation failed")
});

pub static STATUS_QUERIES: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "veto_status_queries_total",
        "Card status queries answered",
    )
    .expect("metric creation failed")
});

pub static DEAD_LETTERS: LazyLock<IntCounter> = LazyLock::new(|| {
    IntCounter::new(
        "veto_dead_letters_total",
        "Dead-letter payloads consumed",
    )
    .expect("metric creation failed")
});

/// Guard to ensure metrics are only registered once.
static REGISTER_ONCE: Once = Once::new();

/// Register all metrics with the global registry.
///
/// Idempotent: subsequent calls after the first are no-ops, which keeps
/// integration tests that build multiple routers safe.
pub fn register_metrics() {
    REGISTER_ONCE.call_once(|| {
        REGISTRY
            .register(Box::new(COMMANDS_PROCESSED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(COMMAND_DURATION.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(STATUS_QUERIES.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(DEAD_LETTERS.clone()))
            .expect("metric registration failed");

        // Engine-owned counters
        REGISTRY
            .register(Box::new(BLOCKS_APPLIED.clone()))
            .expect("metric registration failed");
        REGISTRY
            .register(Box::new(FAILOPEN_READS.clone()))
            .expect("metric registration failed");
    });
}

/// GET /metrics - Prometheus metrics endpoint.
pub async fn metrics_handler() -> impl IntoResponse {
    let encoder = TextEncoder::new();
    let metric_families = REGISTRY.gather();

    let mut buffer = Vec::new();
    match encoder.encode(&metric_families, &mut buffer) {
        Ok(()) => (
            StatusCode::OK,
            [("content-type", "text/plain; version=0.0.4; charset=utf-8")],
            buffer,
        ),
        Err(e) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            [("content-type", "text/plain; charset=utf-8")],
            format!("Failed to encode metrics: {e}").into_bytes(),
        ),
    }
}

/// Helper to record a command outcome by handler.
pub fn record_command(handler: &str, outcome: &str) {
    COMMANDS_PROCESSED
        .with_label_values(&[handler, outcome])
        .inc();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_metrics_registration() {
        // This would panic if any metric creation failed
        register_metrics();
    }
}
