//! Session domain module.
//!
//! A session is one conversation with the agent, keyed either by an explicit
//! session id or by `user_{user_id}`. It carries the conversation history and
//! the agent-side session id used to resume the conversation.

mod aggregate;
mod errors;
mod reply;

pub use aggregate::{
    session_key, user_id_from_key, ConversationMessage, MessageRole, SessionData,
    USER_SESSION_PREFIX,
};
pub use errors::SessionError;
pub use reply::ChatReply;
