//! HTTP routes for chat endpoints.

use axum::{routing::post, Router};

use super::handlers::{chat, chat_async, chat_stream};
use crate::adapters::http::state::AppState;

/// Chat routes, mounted at the root.
///
/// - `POST /chat` - default or requested response mode
/// - `POST /chat/stream` - server-sent events
/// - `POST /chat/async` - background task or debounce buffer
pub fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/chat", post(chat))
        .route("/chat/stream", post(chat_stream))
        .route("/chat/async", post(chat_async))
}
