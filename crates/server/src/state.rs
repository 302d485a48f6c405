//! Application state shared across handlers.

use std::sync::Arc;
use veto_core::Clock;
use veto_core::config::AppConfig;
use veto_engine::{BlockEngine, DeadLetterSink, ErrorNotifier, RestorePipeline, StatusEvaluator};
use veto_storage::CardStore;

/// Shared application state.
///
/// The store and clock are process-wide and effectively immutable after
/// bootstrap; command handlers themselves are stateless.
#[derive(Clone)]
pub struct AppState {
    /// Application configuration.
    pub config: Arc<AppConfig>,
    /// Card store backend.
    pub store: Arc<dyn CardStore>,
    /// Retry & block command handler.
    pub engine: Arc<BlockEngine>,
    /// Read-side status evaluator.
    pub status: Arc<StatusEvaluator>,
    /// Daily-retry restore handler.
    pub restore: Arc<RestorePipeline>,
    /// Dead-letter consumer.
    pub dead_letter: Arc<DeadLetterSink>,
}

impl AppState {
    /// Wire the command handlers around one store, clock and notifier.
    pub fn new(
        config: AppConfig,
        store: Arc<dyn CardStore>,
        clock: Arc<dyn Clock>,
        notifier: Arc<dyn ErrorNotifier>,
    ) -> Self {
        Self {
            config: Arc::new(config),
            store: store.clone(),
            engine: Arc::new(BlockEngine::new(store.clone(), clock.clone())),
            status: Arc::new(StatusEvaluator::new(store.clone(), clock.clone())),
            restore: Arc::new(RestorePipeline::new(store, clock)),
            dead_letter: Arc::new(DeadLetterSink::new(notifier)),
        }
    }
}
