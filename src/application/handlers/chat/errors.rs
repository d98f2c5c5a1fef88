//! Errors raised by chat handlers.

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::domain::session::SessionError;
use crate::ports::AgentError;

/// Failure of a chat turn.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ChatError {
    #[error("Invalid request: {0}")]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Session(#[from] SessionError),
}

impl ChatError {
    pub fn code(&self) -> ErrorCode {
        match self {
            ChatError::Validation(_) => ErrorCode::ValidationFailed,
            ChatError::Agent(AgentError::Timeout { .. }) => ErrorCode::AgentTimeout,
            ChatError::Agent(_) => ErrorCode::AgentError,
            ChatError::Session(err) => err.code(),
        }
    }
}
