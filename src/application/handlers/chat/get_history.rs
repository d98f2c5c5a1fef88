//! GetHistoryHandler - query for a session's conversation.

use std::sync::Arc;

use crate::application::SessionManager;
use crate::domain::session::{user_id_from_key, ConversationMessage, SessionError};

/// Conversation history of one session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionHistory {
    pub session_id: String,
    pub user_id: String,
    pub messages: Vec<ConversationMessage>,
}

impl SessionHistory {
    pub fn total_messages(&self) -> usize {
        self.messages.len()
    }
}

pub struct GetHistoryHandler {
    sessions: Arc<SessionManager>,
}

impl GetHistoryHandler {
    pub fn new(sessions: Arc<SessionManager>) -> Self {
        Self { sessions }
    }

    pub async fn handle(&self, session_id: &str) -> Result<SessionHistory, SessionError> {
        let session = self.sessions.get(session_id).await?;
        let user_id = session
            .user_id
            .clone()
            .unwrap_or_else(|| user_id_from_key(session_id).to_string());

        Ok(SessionHistory {
            session_id: session.session_id,
            user_id,
            messages: session.conversation_history,
        })
    }
}
