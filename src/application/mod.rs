//! Application layer - handlers and services.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! sessions are loaded through `SessionManager`, chat turns run through the
//! chat handlers, and async turns are scheduled by `TaskManager`.

pub mod handlers;
mod session_manager;
mod task_manager;

pub use handlers::chat::{
    ChatCommand, ChatError, ChatEventStream, ChatSettings, ChatStreamEvent, ClearSessionHandler,
    ContextMode, GetHistoryHandler, SendMessageHandler, SessionHistory, StreamMessageHandler,
};
pub use session_manager::SessionManager;
pub use task_manager::{TaskManager, TaskManagerConfig};
