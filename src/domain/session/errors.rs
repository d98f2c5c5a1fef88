//! Session-specific error types.

use crate::domain::foundation::{ErrorCode, ValidationError};
use crate::ports::SessionStoreError;

/// Errors raised while loading or mutating sessions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    /// No stored session under this key.
    NotFound(String),
    /// Request input was rejected.
    ValidationFailed { field: String, message: String },
    /// The session store failed.
    Storage(String),
}

impl SessionError {
    pub fn not_found(session_id: impl Into<String>) -> Self {
        SessionError::NotFound(session_id.into())
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        SessionError::ValidationFailed {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn storage(message: impl Into<String>) -> Self {
        SessionError::Storage(message.into())
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            SessionError::NotFound(_) => ErrorCode::SessionNotFound,
            SessionError::ValidationFailed { .. } => ErrorCode::ValidationFailed,
            SessionError::Storage(_) => ErrorCode::StorageError,
        }
    }

    pub fn message(&self) -> String {
        match self {
            SessionError::NotFound(id) => format!("Session not found: {}", id),
            SessionError::ValidationFailed { field, message } => {
                format!("Validation failed for '{}': {}", field, message)
            }
            SessionError::Storage(msg) => format!("Session storage error: {}", msg),
        }
    }
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message())
    }
}

impl std::error::Error for SessionError {}

impl From<SessionStoreError> for SessionError {
    fn from(err: SessionStoreError) -> Self {
        SessionError::Storage(err.to_string())
    }
}

impl From<ValidationError> for SessionError {
    fn from(err: ValidationError) -> Self {
        let field = err.field().unwrap_or("request").to_string();
        SessionError::ValidationFailed {
            field,
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_maps_to_session_not_found() {
        let err = SessionError::not_found("user_42");
        assert_eq!(err.code(), ErrorCode::SessionNotFound);
        assert_eq!(err.to_string(), "Session not found: user_42");
    }

    #[test]
    fn store_errors_become_storage() {
        let err: SessionError = SessionStoreError::backend("connection refused").into();
        assert_eq!(err.code(), ErrorCode::StorageError);
        assert!(err.message().contains("connection refused"));
    }

    #[test]
    fn validation_error_keeps_field() {
        let err: SessionError = ValidationError::empty_field("user_id").into();
        match err {
            SessionError::ValidationFailed { field, .. } => assert_eq!(field, "user_id"),
            other => panic!("unexpected: {:?}", other),
        }
    }
}
