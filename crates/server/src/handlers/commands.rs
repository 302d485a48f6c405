//! Transport delivery endpoints.
//!
//! The message transport pushes command envelopes here one at a time. A
//! non-2xx response means the command failed and the transport should
//! redeliver; after enough failures the payload arrives on the dead-letter
//! route instead.

use crate::error::ApiResult;
use crate::metrics;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use serde::Serialize;
use veto_core::command::TransportEvent;
use veto_engine::EngineResult;

/// Acknowledgement body for processed commands.
#[derive(Debug, Serialize)]
pub struct ProcessedResponse {
    pub processed: bool,
}

fn observe(handler: &'static str, result: &EngineResult<()>) {
    let outcome = match result {
        Ok(()) => "ok",
        Err(e) if e.is_conflict() => "conflict",
        Err(_) => "error",
    };
    metrics::record_command(handler, outcome);
}

/// POST /v1/queues/retry-block
pub async fn deliver_retry_block(
    State(state): State<AppState>,
    Json(event): Json<TransportEvent>,
) -> ApiResult<Json<ProcessedResponse>> {
    let timer = metrics::COMMAND_DURATION
        .with_label_values(&["retry_block"])
        .start_timer();
    let result = state.engine.handle(&event).await;
    timer.observe_duration();

    observe("retry_block", &result);
    result?;
    Ok(Json(ProcessedResponse { processed: true }))
}

/// POST /v1/queues/restore-daily
pub async fn deliver_restore_daily(
    State(state): State<AppState>,
    Json(event): Json<TransportEvent>,
) -> ApiResult<Json<ProcessedResponse>> {
    let timer = metrics::COMMAND_DURATION
        .with_label_values(&["restore_daily"])
        .start_timer();
    let result = state.restore.handle(&event).await;
    timer.observe_duration();

    observe("restore_daily", &result);
    result?;
    Ok(Json(ProcessedResponse { processed: true }))
}

/// POST /v1/queues/retry-block/dead-letter
pub async fn deliver_dead_letter(
    State(state): State<AppState>,
    Json(event): Json<TransportEvent>,
) -> ApiResult<Json<ProcessedResponse>> {
    state.dead_letter.handle(&event).await?;
    metrics::DEAD_LETTERS.inc();
    Ok(Json(ProcessedResponse { processed: true }))
}
