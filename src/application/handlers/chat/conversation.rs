//! Turn preparation and recording shared by the sync and streaming paths.

use std::collections::HashMap;
use std::sync::Arc;

use serde::Deserialize;
use serde_json::Value;

use super::errors::ChatError;
use crate::application::SessionManager;
use crate::domain::formatter::MessageFormatter;
use crate::domain::foundation::ValidationError;
use crate::domain::session::{session_key, ChatReply, ConversationMessage, SessionData};
use crate::ports::{AgentRequest, AgentResponse};

/// How earlier turns reach the agent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ContextMode {
    /// Resume the agent's own session by id.
    #[default]
    Resume,
    /// Inline recent history into every prompt.
    History,
}

/// Prompt-building settings for chat handlers.
#[derive(Debug, Clone)]
pub struct ChatSettings {
    pub formatter: Option<MessageFormatter>,
    pub context_mode: ContextMode,
    pub max_history_turns: usize,
}

impl Default for ChatSettings {
    fn default() -> Self {
        Self {
            formatter: None,
            context_mode: ContextMode::Resume,
            max_history_turns: 10,
        }
    }
}

/// One user message to send to the agent.
#[derive(Debug, Clone, PartialEq)]
pub struct ChatCommand {
    pub message: String,
    pub user_id: String,
    pub session_id: Option<String>,
    pub metadata: HashMap<String, Value>,
}

impl ChatCommand {
    pub fn new(message: impl Into<String>, user_id: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            user_id: user_id.into(),
            session_id: None,
            metadata: HashMap::new(),
        }
    }

    pub fn with_session_id(mut self, session_id: Option<String>) -> Self {
        self.session_id = session_id;
        self
    }

    pub fn with_metadata(mut self, metadata: HashMap<String, Value>) -> Self {
        self.metadata = metadata;
        self
    }

    /// Key of the session this command belongs to.
    pub fn session_key(&self) -> String {
        session_key(&self.user_id, self.session_id.as_deref())
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.user_id.trim().is_empty() {
            return Err(ValidationError::empty_field("user_id"));
        }
        Ok(())
    }
}

/// A prepared turn waiting for the agent's answer.
#[derive(Debug, Clone)]
pub(crate) struct ChatTurn {
    pub session_key: String,
    pub user_id: String,
    pub raw_message: String,
    pub request: AgentRequest,
}

#[derive(Clone)]
pub(crate) struct Conversation {
    sessions: Arc<SessionManager>,
    settings: ChatSettings,
}

impl Conversation {
    pub fn new(sessions: Arc<SessionManager>, settings: ChatSettings) -> Self {
        Self { sessions, settings }
    }

    /// Loads the session and builds the agent request for `cmd`.
    pub async fn begin(&self, cmd: &ChatCommand) -> Result<ChatTurn, ChatError> {
        cmd.validate()?;
        let key = cmd.session_key();
        let session = self
            .sessions
            .get_or_create(&key, Some(cmd.user_id.clone()))
            .await?;

        let formatted = match &self.settings.formatter {
            Some(formatter) => formatter.format(&cmd.message, &cmd.user_id, &cmd.metadata),
            None => cmd.message.clone(),
        };

        Ok(ChatTurn {
            session_key: key,
            user_id: cmd.user_id.clone(),
            raw_message: cmd.message.clone(),
            request: build_request(&self.settings, &session, formatted),
        })
    }

    /// Records the exchange and the agent session id, returning the reply.
    pub async fn finish(
        &self,
        turn: ChatTurn,
        response: &AgentResponse,
    ) -> Result<ChatReply, ChatError> {
        // Reload so that writes made while the agent was busy are kept.
        let mut session = self
            .sessions
            .get_or_create(&turn.session_key, Some(turn.user_id.clone()))
            .await?;

        if let Some(id) = &response.agent_session_id {
            session.agent_session_id = Some(id.clone());
        }
        session.push_message(ConversationMessage::user(turn.raw_message));
        session.push_message(ConversationMessage::assistant(response.content.clone()));
        self.sessions.save(&session).await?;

        Ok(ChatReply {
            content: response.content.clone(),
            session_id: turn.session_key,
            agent_session_id: session.agent_session_id.clone(),
            success: !response.is_error,
            metadata: response.metadata(),
        })
    }
}

fn build_request(settings: &ChatSettings, session: &SessionData, message: String) -> AgentRequest {
    match settings.context_mode {
        ContextMode::Resume => {
            AgentRequest::new(message).resuming(session.agent_session_id.clone())
        }
        ContextMode::History => {
            let history = session.recent_history(settings.max_history_turns);
            if history.is_empty() {
                return AgentRequest::new(message);
            }
            let mut prompt = String::from("Previous conversation:\n");
            for entry in history {
                prompt.push_str(entry.role.label());
                prompt.push_str(": ");
                prompt.push_str(&entry.content);
                prompt.push('\n');
            }
            prompt.push_str("\nUser: ");
            prompt.push_str(&message);
            AgentRequest::new(prompt)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn session_with_history(turns: usize) -> SessionData {
        let mut session = SessionData::new("user_1", Some("1".to_string()));
        session.agent_session_id = Some("abc".to_string());
        for i in 0..turns {
            session.push_message(ConversationMessage::user(format!("q{}", i)));
            session.push_message(ConversationMessage::assistant(format!("a{}", i)));
        }
        session
    }

    #[test]
    fn resume_mode_passes_agent_session_id() {
        let request = build_request(
            &ChatSettings::default(),
            &session_with_history(1),
            "next".to_string(),
        );
        assert_eq!(request.prompt, "next");
        assert_eq!(request.resume_session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn history_mode_inlines_recent_turns() {
        let settings = ChatSettings {
            context_mode: ContextMode::History,
            max_history_turns: 1,
            ..Default::default()
        };
        let request = build_request(&settings, &session_with_history(3), "next".to_string());

        assert_eq!(
            request.prompt,
            "Previous conversation:\nUser: q2\nAssistant: a2\n\nUser: next"
        );
        assert!(request.resume_session_id.is_none());
    }

    #[test]
    fn history_mode_without_history_sends_message_only() {
        let settings = ChatSettings {
            context_mode: ContextMode::History,
            ..Default::default()
        };
        let request = build_request(&settings, &session_with_history(0), "hello".to_string());
        assert_eq!(request.prompt, "hello");
    }

    #[test]
    fn command_derives_session_key() {
        let cmd = ChatCommand::new("hi", "alice");
        assert_eq!(cmd.session_key(), "user_alice");
        let cmd = cmd.with_session_id(Some("team".to_string()));
        assert_eq!(cmd.session_key(), "team");
    }

    #[test]
    fn blank_user_id_is_rejected() {
        assert!(ChatCommand::new("hi", "  ").validate().is_err());
    }
}
