//! HTTP adapter for chat endpoints.

mod dto;
mod handlers;
mod routes;

pub use dto::{AsyncChatResponse, ChatRequest, ChatResponse, StreamDone, StreamError};
pub use routes::chat_routes;
