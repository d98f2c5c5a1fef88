//! Data transfer objects for session endpoints.

use serde::{Deserialize, Serialize};

use crate::application::SessionHistory;
use crate::domain::session::ConversationMessage;

/// Stored conversation of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub session_id: String,
    pub user_id: String,
    pub messages: Vec<ConversationMessage>,
    pub total_messages: usize,
}

impl From<SessionHistory> for HistoryResponse {
    fn from(history: SessionHistory) -> Self {
        Self {
            total_messages: history.total_messages(),
            session_id: history.session_id,
            user_id: history.user_id,
            messages: history.messages,
        }
    }
}

/// Debounce buffer state of a session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PendingResponse {
    pub session_id: String,
    pub pending_messages: usize,
    /// A flushed batch is being dispatched right now.
    pub flushing: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CancelPendingResponse {
    pub session_id: String,
    pub cancelled: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClearSessionResponse {
    pub session_id: String,
    /// Whether a stored session existed.
    pub deleted: bool,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn history_response_counts_messages() {
        let history = SessionHistory {
            session_id: "user_a".to_string(),
            user_id: "a".to_string(),
            messages: vec![
                ConversationMessage::user("hi"),
                ConversationMessage::assistant("hello"),
            ],
        };

        let body = serde_json::to_value(HistoryResponse::from(history)).unwrap();

        assert_eq!(body["total_messages"], 2);
        assert_eq!(body["messages"][0]["role"], "user");
        assert_eq!(body["messages"][1]["content"], "hello");
        assert!(body["messages"][0]["timestamp"].is_string());
    }
}
