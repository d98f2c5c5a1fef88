//! Error vocabulary shared by every layer.

use std::fmt;
use thiserror::Error;

/// Errors raised while validating request input or state changes.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' has invalid value: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Cannot move from {from} to {to}")]
    InvalidTransition { from: String, to: String },
}

impl ValidationError {
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    pub fn invalid_value(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidValue {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_transition(from: impl fmt::Debug, to: impl fmt::Debug) -> Self {
        ValidationError::InvalidTransition {
            from: format!("{:?}", from),
            to: format!("{:?}", to),
        }
    }

    /// Name of the offending field, if the error concerns one.
    pub fn field(&self) -> Option<&str> {
        match self {
            ValidationError::EmptyField { field } | ValidationError::InvalidValue { field, .. } => {
                Some(field)
            }
            ValidationError::InvalidTransition { .. } => None,
        }
    }
}

/// Machine-readable error codes returned in API error bodies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    // Validation
    ValidationFailed,

    // Not found
    SessionNotFound,
    TaskNotFound,

    // Access
    Unauthorized,
    Forbidden,

    // Agent
    AgentError,
    AgentTimeout,

    // Infrastructure
    StorageError,
    InternalError,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::SessionNotFound => "SESSION_NOT_FOUND",
            ErrorCode::TaskNotFound => "TASK_NOT_FOUND",
            ErrorCode::Unauthorized => "UNAUTHORIZED",
            ErrorCode::Forbidden => "FORBIDDEN",
            ErrorCode::AgentError => "AGENT_ERROR",
            ErrorCode::AgentTimeout => "AGENT_TIMEOUT",
            ErrorCode::StorageError => "STORAGE_ERROR",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_field_displays_correctly() {
        let err = ValidationError::empty_field("user_id");
        assert_eq!(err.to_string(), "Field 'user_id' cannot be empty");
        assert_eq!(err.field(), Some("user_id"));
    }

    #[test]
    fn invalid_value_displays_reason() {
        let err = ValidationError::invalid_value("debounce_window", "must be greater than zero");
        assert_eq!(
            err.to_string(),
            "Field 'debounce_window' has invalid value: must be greater than zero"
        );
    }

    #[test]
    fn invalid_transition_has_no_field() {
        let err = ValidationError::invalid_transition("Completed", "Pending");
        assert!(err.field().is_none());
        assert!(err.to_string().contains("Completed"));
    }

    #[test]
    fn error_code_display_is_screaming_snake() {
        assert_eq!(ErrorCode::SessionNotFound.to_string(), "SESSION_NOT_FOUND");
        assert_eq!(ErrorCode::AgentTimeout.to_string(), "AGENT_TIMEOUT");
    }
}
