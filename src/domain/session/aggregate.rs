//! Session record tracked per conversation.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Prefix used for sessions keyed by user when no explicit id is given.
pub const USER_SESSION_PREFIX: &str = "user_";

/// Derives the session key for a request: the explicit id, or `user_{user_id}`.
pub fn session_key(user_id: &str, session_id: Option<&str>) -> String {
    match session_id {
        Some(id) if !id.is_empty() => id.to_string(),
        _ => format!("{}{}", USER_SESSION_PREFIX, user_id),
    }
}

/// Recovers the user id from a `user_{id}` session key.
///
/// Custom session ids have no embedded user and are returned unchanged.
pub fn user_id_from_key(session_key: &str) -> &str {
    session_key
        .strip_prefix(USER_SESSION_PREFIX)
        .unwrap_or(session_key)
}

/// Who authored a message in the conversation history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    /// Speaker label used when history is inlined into a prompt.
    pub fn label(&self) -> &'static str {
        match self {
            MessageRole::User => "User",
            MessageRole::Assistant => "Assistant",
        }
    }
}

/// A single entry in a session's conversation history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: MessageRole,
    pub content: String,
    pub timestamp: DateTime<Utc>,
}

impl ConversationMessage {
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
            timestamp: Utc::now(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(MessageRole::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(MessageRole::Assistant, content)
    }
}

/// Persistent state of one conversation.
///
/// `agent_session_id` is the identifier the agent CLI hands back so that the
/// next turn can resume the same conversation on its side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionData {
    pub session_id: String,
    #[serde(default)]
    pub user_id: Option<String>,
    #[serde(default)]
    pub conversation_history: Vec<ConversationMessage>,
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,
    pub created_at: DateTime<Utc>,
    pub last_activity: DateTime<Utc>,
    #[serde(default)]
    pub agent_session_id: Option<String>,
}

impl SessionData {
    pub fn new(session_id: impl Into<String>, user_id: Option<String>) -> Self {
        let now = Utc::now();
        Self {
            session_id: session_id.into(),
            user_id,
            conversation_history: Vec::new(),
            metadata: HashMap::new(),
            created_at: now,
            last_activity: now,
            agent_session_id: None,
        }
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, serde_json::Value>) -> Self {
        self.metadata = metadata;
        self
    }

    pub fn push_message(&mut self, message: ConversationMessage) {
        self.conversation_history.push(message);
    }

    /// Marks the session as active now. Stores call this on every save.
    pub fn touch(&mut self) {
        self.last_activity = Utc::now();
    }

    /// The last `max_turns` user/assistant exchanges.
    pub fn recent_history(&self, max_turns: usize) -> &[ConversationMessage] {
        let keep = max_turns.saturating_mul(2);
        let start = self.conversation_history.len().saturating_sub(keep);
        &self.conversation_history[start..]
    }
}
