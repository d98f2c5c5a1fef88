//! HTTP adapters - REST API implementations.
//!
//! Each endpoint group has its own module with DTOs, handlers and routes;
//! `create_router` assembles them behind the shared middleware.

pub mod chat;
pub mod dto;
pub mod health;
pub mod middleware;
pub mod router;
pub mod sessions;
pub mod state;
pub mod tasks;

pub use dto::ErrorResponse;
pub use router::create_router;
pub use state::AppState;
