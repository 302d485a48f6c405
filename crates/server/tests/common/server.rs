//! Server test utilities.

use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;
use veto_core::FixedClock;
use veto_core::config::AppConfig;
use veto_engine::LogNotifier;
use veto_server::{AppState, create_router};
use veto_storage::{CardStore, MemoryStore};

/// Fixed "now" every test server starts at.
pub const NOW: i64 = 1_700_000_000_000;

/// A test server wrapper with all dependencies.
/// Note: #[allow(dead_code)] because each test file compiles common/ separately.
#[allow(dead_code)]
pub struct TestServer {
    pub router: axum::Router,
    pub store: Arc<MemoryStore>,
    pub clock: Arc<FixedClock>,
}

#[allow(dead_code)]
impl TestServer {
    /// Create a new test server over an in-memory store and a fixed clock.
    pub fn new() -> Self {
        let store = Arc::new(MemoryStore::new());
        let clock = Arc::new(FixedClock::new(NOW));

        let state = AppState::new(
            AppConfig::for_testing(),
            store.clone() as Arc<dyn CardStore>,
            clock.clone(),
            Arc::new(LogNotifier),
        );
        let router = create_router(state);

        Self {
            router,
            store,
            clock,
        }
    }
}

/// Helper to make JSON requests.
#[allow(dead_code)]
pub async fn json_request(
    router: &axum::Router,
    method: &str,
    uri: &str,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);

    let body = match body {
        Some(v) => {
            builder = builder.header("Content-Type", "application/json");
            Body::from(serde_json::to_vec(&v).unwrap())
        }
        None => Body::empty(),
    };

    let request = builder.body(body).unwrap();
    let response = router.clone().oneshot(request).await.unwrap();

    let status = response.status();
    let body_bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();

    let json: Value = if body_bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&body_bytes).unwrap_or(Value::Null)
    };

    (status, json)
}

/// Wrap a command body in a single-record transport envelope.
#[allow(dead_code)]
pub fn envelope(body: &Value) -> Value {
    json!({ "Records": [ { "body": body.to_string() } ] })
}
