//! HTTP adapter for session endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{CancelPendingResponse, ClearSessionResponse, HistoryResponse, PendingResponse};
pub use routes::session_routes;
