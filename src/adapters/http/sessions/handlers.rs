//! HTTP handlers for session endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::dto::{CancelPendingResponse, ClearSessionResponse, HistoryResponse, PendingResponse};
use crate::adapters::http::dto::handle_session_error;
use crate::adapters::http::state::AppState;

/// GET /session/:id/history - Stored conversation
pub async fn get_history(State(state): State<AppState>, Path(session_id): Path<String>) -> Response {
    match state.get_history.handle(&session_id).await {
        Ok(history) => (StatusCode::OK, Json(HistoryResponse::from(history))).into_response(),
        Err(e) => handle_session_error(e),
    }
}

/// GET /session/:id/pending - Messages waiting in the debounce buffer
pub async fn get_pending(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<PendingResponse> {
    let pending_messages = state.buffer.get_pending_count(&session_id).await;
    let flushing = state.buffer.is_flushing(&session_id).await;
    Json(PendingResponse {
        session_id,
        pending_messages,
        flushing,
    })
}

/// DELETE /session/:id/pending - Stop the scheduled flush, keeping messages
pub async fn cancel_pending(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Json<CancelPendingResponse> {
    let cancelled = state.buffer.cancel_pending(&session_id).await;
    tracing::info!(session_key = %session_id, cancelled, "Cancel pending flush requested");
    Json(CancelPendingResponse {
        session_id,
        cancelled,
    })
}

/// DELETE /session/:id - Forget the session and its buffered messages
pub async fn clear_session(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.clear_session.handle(&session_id).await {
        Ok(deleted) => {
            tracing::info!(session_key = %session_id, deleted, "Session cleared");
            let response = ClearSessionResponse {
                session_id,
                deleted,
                message: "Session cleared successfully".to_string(),
            };
            (StatusCode::OK, Json(response)).into_response()
        }
        Err(e) => handle_session_error(e),
    }
}
