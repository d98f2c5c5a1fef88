//! HTTP middleware for axum.
//!
//! - `auth` - shared API key check

pub mod auth;

pub use auth::{require_api_key, ApiKeyState, API_KEY_HEADER};
