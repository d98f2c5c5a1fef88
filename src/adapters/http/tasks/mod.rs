//! HTTP adapter for async task polling.

mod dto;
mod handlers;
mod routes;

pub use dto::TaskResponse;
pub use routes::task_routes;
