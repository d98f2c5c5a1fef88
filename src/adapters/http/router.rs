//! Router setup with all API routes and middleware.

use axum::http::{header, HeaderName, HeaderValue, Method};
use axum::middleware::from_fn_with_state;
use axum::routing::get;
use axum::Router;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::chat::chat_routes;
use super::health::health;
use super::middleware::{require_api_key, API_KEY_HEADER};
use super::sessions::session_routes;
use super::state::AppState;
use super::tasks::task_routes;

/// Builds the gateway router.
///
/// `/health` is always public; every other route sits behind the API key
/// check when the state carries a key. An empty `cors_origins` list, or one
/// containing `*`, allows any origin.
pub fn create_router(state: AppState, cors_origins: &[String]) -> Router {
    let mut protected = Router::new()
        .merge(chat_routes())
        .merge(task_routes())
        .merge(session_routes());

    if let Some(key) = state.api_key.clone() {
        protected = protected.route_layer(from_fn_with_state(key, require_api_key));
    }

    Router::new()
        .route("/health", get(health))
        .merge(protected)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(cors_origins))
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let base = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers([
            header::CONTENT_TYPE,
            header::ACCEPT,
            HeaderName::from_static(API_KEY_HEADER),
        ]);

    if origins.is_empty() || origins.iter().any(|o| o == "*") {
        return base.allow_origin(Any);
    }

    let parsed: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse::<HeaderValue>() {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring unparsable CORS origin");
                None
            }
        })
        .collect();
    base.allow_origin(AllowOrigin::list(parsed))
}
