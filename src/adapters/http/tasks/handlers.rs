//! HTTP handlers for task endpoints.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

use super::dto::TaskResponse;
use crate::adapters::http::dto::ErrorResponse;
use crate::adapters::http::state::AppState;

/// GET /task/:id - Status of one task
pub async fn get_task(State(state): State<AppState>, Path(task_id): Path<String>) -> Response {
    match state.tasks.get(&task_id).await {
        Some(task) => (StatusCode::OK, Json(TaskResponse::from(task))).into_response(),
        None => ErrorResponse::not_found("Task", &task_id).into_response_with(StatusCode::NOT_FOUND),
    }
}

/// GET /session/:id/task - Most recent task of a session
pub async fn get_session_task(
    State(state): State<AppState>,
    Path(session_id): Path<String>,
) -> Response {
    match state.tasks.latest_for_session(&session_id).await {
        Some(task) => (StatusCode::OK, Json(TaskResponse::from(task))).into_response(),
        None => ErrorResponse::not_found("Task", &format!("no task for session {}", session_id))
            .into_response_with(StatusCode::NOT_FOUND),
    }
}
