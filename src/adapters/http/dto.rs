//! Response types shared by every HTTP module.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::{Deserialize, Serialize};

use crate::application::ChatError;
use crate::domain::foundation::ErrorCode;
use crate::domain::session::SessionError;
use crate::ports::AgentError;

/// Error body returned by every endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
}

impl ErrorResponse {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code: code.as_str().to_string(),
            message: message.into(),
            details: None,
        }
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ValidationFailed, message)
    }

    pub fn not_found(resource_type: &str, id: &str) -> Self {
        let code = match resource_type {
            "Task" => ErrorCode::TaskNotFound,
            _ => ErrorCode::SessionNotFound,
        };
        Self::new(code, format!("{} not found: {}", resource_type, id))
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Unauthorized, message)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Forbidden, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn into_response_with(self, status: StatusCode) -> Response {
        (status, Json(self)).into_response()
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Error mapping
// ════════════════════════════════════════════════════════════════════════════

pub fn handle_session_error(error: SessionError) -> Response {
    let status = match &error {
        SessionError::NotFound(_) => StatusCode::NOT_FOUND,
        SessionError::ValidationFailed { .. } => StatusCode::BAD_REQUEST,
        SessionError::Storage(msg) => {
            tracing::error!(error = %msg, "Session store failure");
            StatusCode::INTERNAL_SERVER_ERROR
        }
    };
    ErrorResponse::new(error.code(), error.message()).into_response_with(status)
}

pub fn handle_chat_error(error: ChatError) -> Response {
    let status = match &error {
        ChatError::Validation(_) => StatusCode::BAD_REQUEST,
        ChatError::Session(inner) => return handle_session_error(inner.clone()),
        ChatError::Agent(AgentError::Timeout { .. }) => StatusCode::GATEWAY_TIMEOUT,
        ChatError::Agent(_) => StatusCode::BAD_GATEWAY,
    };
    ErrorResponse::new(error.code(), error.to_string()).into_response_with(status)
}
