//! Route configuration.

use crate::handlers;
use crate::metrics::metrics_handler;
use crate::state::AppState;
use axum::Router;
use axum::routing::{get, post};
use tower_http::trace::TraceLayer;

/// Create the application router.
pub fn create_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Health check (intentionally unauthenticated for load balancers/probes)
        .route("/v1/health", get(handlers::health_check))
        // Read side: status queries from authorizers
        .route("/v1/cards/status", post(handlers::check_card_status))
        // Write side: transport deliveries, one envelope per request
        .route("/v1/queues/retry-block", post(handlers::deliver_retry_block))
        .route(
            "/v1/queues/retry-block/dead-letter",
            post(handlers::deliver_dead_letter),
        )
        .route(
            "/v1/queues/restore-daily",
            post(handlers::deliver_restore_daily),
        );

    let mut router = Router::new().merge(api_routes);

    // Conditionally add the metrics endpoint. When enabled it MUST be
    // network-restricted to authorized scraper IPs.
    if state.config.server.metrics_enabled {
        router = router.merge(Router::new().route("/metrics", get(metrics_handler)));
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
