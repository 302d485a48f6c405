//! Card status query endpoint.

use crate::error::{ApiError, ApiResult};
use crate::metrics;
use crate::state::AppState;
use axum::Json;
use axum::extract::State;
use veto_core::command::{StatusRequest, StatusResponse};

/// POST /v1/cards/status
///
/// Read-only; called by authorizers before admitting a transaction. The
/// evaluator fails open on storage errors, so the only error surface here is
/// the missing merchant identifier.
pub async fn check_card_status(
    State(state): State<AppState>,
    Json(request): Json<StatusRequest>,
) -> ApiResult<Json<StatusResponse>> {
    let merchant_id = request
        .merchant_identifier
        .as_deref()
        .filter(|merchant_id| !merchant_id.is_empty())
        .ok_or_else(|| ApiError::BadRequest("merchantIdentifier is required".to_string()))?;

    metrics::STATUS_QUERIES.inc();
    let status = state.status.evaluate(&request.card_id, merchant_id).await;
    Ok(Json(status))
}
