//! HTTP routes for session endpoints.

use axum::{
    routing::{delete, get},
    Router,
};

use super::handlers::{cancel_pending, clear_session, get_history, get_pending};
use crate::adapters::http::state::AppState;

/// Creates the session router.
pub fn session_routes() -> Router<AppState> {
    Router::new()
        .route("/session/:session_id", delete(clear_session))
        .route("/session/:session_id/history", get(get_history))
        .route(
            "/session/:session_id/pending",
            get(get_pending).delete(cancel_pending),
        )
}
