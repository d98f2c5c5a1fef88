//! Chat handlers.
//!
//! - `SendMessageHandler` - one turn, full answer
//! - `StreamMessageHandler` - one turn, incremental answer
//! - `GetHistoryHandler` - stored conversation of a session
//! - `ClearSessionHandler` - delete a session and its buffered messages

mod clear_session;
mod conversation;
mod errors;
mod get_history;
mod send_message;
mod stream_message;

pub use clear_session::ClearSessionHandler;
pub use conversation::{ChatCommand, ChatSettings, ContextMode};
pub use errors::ChatError;
pub use get_history::{GetHistoryHandler, SessionHistory};
pub use send_message::SendMessageHandler;
pub use stream_message::{ChatEventStream, ChatStreamEvent, StreamMessageHandler};
