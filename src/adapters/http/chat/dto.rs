//! Data transfer objects for chat endpoints.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::application::ChatCommand;
use crate::config::ResponseMode;
use crate::domain::foundation::ValidationError;
use crate::domain::session::ChatReply;

// ════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Body of every chat endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatRequest {
    pub message: String,
    pub user_id: String,
    #[serde(default)]
    pub session_id: Option<String>,
    /// Overrides the server's default mode on `POST /chat`.
    #[serde(default)]
    pub response_mode: Option<ResponseMode>,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
    /// Async mode only; falls back to the server setting.
    #[serde(default)]
    pub enable_debounce: Option<bool>,
    /// Quiet period in seconds for this message.
    #[serde(default)]
    pub debounce_window: Option<f64>,
}

impl ChatRequest {
    pub fn debounce_window(&self) -> Result<Option<Duration>, ValidationError> {
        let Some(secs) = self.debounce_window else {
            return Ok(None);
        };
        match Duration::try_from_secs_f64(secs) {
            Ok(window) if !window.is_zero() => Ok(Some(window)),
            _ => Err(ValidationError::invalid_value(
                "debounce_window",
                format!("must be a positive number of seconds, got {}", secs),
            )),
        }
    }

    pub fn to_command(&self) -> ChatCommand {
        ChatCommand::new(self.message.clone(), self.user_id.clone())
            .with_session_id(self.session_id.clone())
            .with_metadata(self.metadata.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════

/// Answer of a synchronous chat turn.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    pub content: String,
    pub session_id: String,
    pub agent_session_id: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}

impl From<ChatReply> for ChatResponse {
    fn from(reply: ChatReply) -> Self {
        Self {
            content: reply.content,
            session_id: reply.session_id,
            agent_session_id: reply.agent_session_id,
            success: reply.success,
            metadata: reply.metadata,
        }
    }
}

/// Immediate answer of the async endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AsyncChatResponse {
    /// `None` while the message sits in the debounce buffer.
    pub task_id: Option<String>,
    pub status: String,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pending_messages: Option<usize>,
}

impl AsyncChatResponse {
    pub fn submitted(task_id: String) -> Self {
        Self {
            task_id: Some(task_id),
            status: "processing".to_string(),
            message: "Task submitted successfully".to_string(),
            session_id: None,
            pending_messages: None,
        }
    }

    pub fn buffered(session_id: String, pending_messages: usize) -> Self {
        Self {
            task_id: None,
            status: "buffered".to_string(),
            message: "Message buffered; it will be sent once the session is quiet".to_string(),
            session_id: Some(session_id),
            pending_messages: Some(pending_messages),
        }
    }
}

/// Payload of the final `done` SSE event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamDone {
    pub session_id: String,
    pub agent_session_id: Option<String>,
}

/// Payload of an `error` SSE event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamError {
    pub error: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn chat_request_deserializes_with_defaults() {
        let request: ChatRequest =
            serde_json::from_value(json!({"message": "hi", "user_id": "u1"})).unwrap();

        assert_eq!(request.message, "hi");
        assert!(request.session_id.is_none());
        assert!(request.response_mode.is_none());
        assert!(request.metadata.is_empty());
        assert_eq!(request.debounce_window().unwrap(), None);
    }

    #[test]
    fn chat_request_reads_mode_and_metadata() {
        let request: ChatRequest = serde_json::from_value(json!({
            "message": "hi",
            "user_id": "u1",
            "session_id": "room-9",
            "response_mode": "async",
            "metadata": {"source": "slack"},
            "enable_debounce": true,
            "debounce_window": 0.5
        }))
        .unwrap();

        assert_eq!(request.response_mode, Some(ResponseMode::Async));
        assert_eq!(request.debounce_window().unwrap(), Some(Duration::from_millis(500)));

        let cmd = request.to_command();
        assert_eq!(cmd.session_key(), "room-9");
        assert_eq!(cmd.metadata["source"], json!("slack"));
    }

    #[test]
    fn unusable_debounce_window_is_rejected() {
        for window in [0.0, -1.0, f64::NAN, f64::INFINITY, 1e300] {
            let request = ChatRequest {
                debounce_window: Some(window),
                ..serde_json::from_value(json!({"message": "m", "user_id": "u"})).unwrap()
            };
            assert!(request.debounce_window().is_err(), "window {} accepted", window);
        }
    }

    #[test]
    fn buffered_response_has_null_task_id() {
        let body = serde_json::to_value(AsyncChatResponse::buffered("user_u".to_string(), 2)).unwrap();
        assert_eq!(body["task_id"], Value::Null);
        assert_eq!(body["status"], "buffered");
        assert_eq!(body["pending_messages"], 2);

        let body = serde_json::to_value(AsyncChatResponse::submitted("t-1".to_string())).unwrap();
        assert_eq!(body["status"], "processing");
        assert!(body.get("pending_messages").is_none());
    }
}
