//! Veto server binary.

use anyhow::{Context, Result};
use clap::Parser;
use figment::Figment;
use figment::providers::{Env, Format, Toml};
use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use veto_core::SystemClock;
use veto_core::config::AppConfig;
use veto_server::{AppState, create_router};

/// Veto - card-usage fraud controls
#[derive(Parser, Debug)]
#[command(name = "vetod")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to configuration file
    #[arg(short, long, env = "VETO_CONFIG", default_value = "config/server.toml")]
    config: String,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Veto v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration (file is optional, env vars can provide/override everything)
    let config_path = std::path::Path::new(&args.config);
    let mut figment = Figment::new();
    let has_config_file = config_path.exists();

    if has_config_file {
        tracing::info!(config_path = %args.config, "Loading configuration from file");
        figment = figment.merge(Toml::file(&args.config));
    } else {
        tracing::debug!("No config file found at {}", args.config);
    }

    let has_env_config =
        std::env::vars().any(|(key, _)| key.starts_with("VETO_") && key != "VETO_CONFIG");

    if !has_config_file && !has_env_config {
        anyhow::bail!(
            "No configuration provided.\n\n\
             Provide configuration via one of:\n  \
             1. Config file: vetod --config /path/to/config.toml\n  \
             2. Environment variables: VETO_STORAGE__TYPE=dynamo \
             VETO_STORAGE__BLOCKED_CARD_TABLE=blocked_cards \
             VETO_STORAGE__RETRY_TABLE=card_retries vetod\n\n\
             See config/server.example.toml for example configuration."
        );
    }

    let config: AppConfig = figment
        .merge(Env::prefixed("VETO_").split("__"))
        .extract()
        .context("failed to load configuration")?;

    // Register Prometheus metrics
    veto_server::metrics::register_metrics();
    tracing::info!("Prometheus metrics registered");

    // Initialize the card store
    let store = veto_storage::from_config(&config.storage)
        .await
        .context("failed to initialize storage")?;
    tracing::info!(backend = store.backend_name(), "Card store initialized");

    // Verify storage connectivity before accepting requests; this catches
    // misconfigured tables and credentials early.
    store
        .health_check()
        .await
        .context("storage health check failed")?;
    tracing::info!("Storage connectivity verified");

    // Error-tracker bridge for the dead-letter sink
    let notifier = veto_engine::notify::from_config(&config.observability);
    if config.observability.rollbar_token.is_none() {
        tracing::warn!("No error-tracker token configured, dead letters will only be logged");
    }

    let bind = config.server.bind.clone();
    let state = AppState::new(config, store, Arc::new(SystemClock), notifier);
    let app = create_router(state);

    let addr: SocketAddr = bind.parse().context("invalid bind address")?;
    tracing::info!("Listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to {addr}"))?;
    axum::serve(listener, app).await?;

    Ok(())
}
