//! HTTP surface for the veto card-control service.
//!
//! Bridges the external transport and authorizer contracts onto the engine:
//! status queries, command deliveries, dead letters, health and metrics.

pub mod error;
pub mod handlers;
pub mod metrics;
pub mod routes;
pub mod state;

pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
