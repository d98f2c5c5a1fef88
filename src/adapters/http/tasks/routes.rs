//! HTTP routes for task endpoints.

use axum::{routing::get, Router};

use super::handlers::{get_session_task, get_task};
use crate::adapters::http::state::AppState;

/// Creates the task router.
pub fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/task/:task_id", get(get_task))
        .route("/session/:session_id/task", get(get_session_task))
}
