//! API key middleware for axum.
//!
//! When a key is configured, protected routes require it in the `X-API-Key`
//! header:
//!
//! ```text
//! X-API-Key: <key>
//! ```
//!
//! # Example
//!
//! ```ignore
//! use axum::{Router, routing::get, middleware};
//!
//! let app = Router::new()
//!     .route("/chat", post(chat))
//!     .route_layer(middleware::from_fn_with_state(key, require_api_key));
//! ```

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::StatusCode,
    middleware::Next,
    response::Response,
};
use secrecy::{ExposeSecret, Secret};
use subtle::ConstantTimeEq;

use crate::adapters::http::dto::ErrorResponse;

/// Header carrying the shared key.
pub const API_KEY_HEADER: &str = "x-api-key";

/// Middleware state - the configured key.
pub type ApiKeyState = Arc<Secret<String>>;

/// Rejects requests whose `X-API-Key` does not match the configured key.
///
/// The comparison runs in constant time.
pub async fn require_api_key(
    State(expected): State<ApiKeyState>,
    request: Request,
    next: Next,
) -> Response {
    let provided = request
        .headers()
        .get(API_KEY_HEADER)
        .and_then(|h| h.to_str().ok());

    match provided {
        Some(key) if key_matches(key, expected.expose_secret()) => next.run(request).await,
        Some(_) => {
            tracing::warn!(path = %request.uri().path(), "Rejected request with invalid API key");
            ErrorResponse::unauthorized("Invalid API key").into_response_with(StatusCode::UNAUTHORIZED)
        }
        None => ErrorResponse::unauthorized("Missing X-API-Key header")
            .into_response_with(StatusCode::UNAUTHORIZED),
    }
}

fn key_matches(provided: &str, expected: &str) -> bool {
    provided.as_bytes().ct_eq(expected.as_bytes()).into()
}
