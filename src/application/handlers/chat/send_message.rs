//! SendMessageHandler - synchronous chat turn.

use std::sync::Arc;
use std::time::Instant;

use super::conversation::{ChatCommand, ChatSettings, Conversation};
use super::errors::ChatError;
use crate::application::SessionManager;
use crate::domain::session::ChatReply;
use crate::ports::{AgentClient, AgentError};

/// Sends one message and waits for the full answer.
#[derive(Clone)]
pub struct SendMessageHandler {
    conversation: Conversation,
    agent: Arc<dyn AgentClient>,
}

impl SendMessageHandler {
    pub fn new(
        sessions: Arc<SessionManager>,
        agent: Arc<dyn AgentClient>,
        settings: ChatSettings,
    ) -> Self {
        Self {
            conversation: Conversation::new(sessions, settings),
            agent,
        }
    }

    pub async fn handle(&self, cmd: ChatCommand) -> Result<ChatReply, ChatError> {
        let turn = self.conversation.begin(&cmd).await?;
        let started = Instant::now();

        tracing::info!(
            session_key = %turn.session_key,
            user_id = %turn.user_id,
            message_chars = turn.raw_message.chars().count(),
            "Sending message to agent"
        );

        let response = self.agent.send(turn.request.clone()).await.map_err(|e| {
            tracing::error!(session_key = %turn.session_key, error = %e, "Agent call failed");
            e
        })?;
        if response.is_error {
            return Err(AgentError::Reported(response.content).into());
        }

        let session_key = turn.session_key.clone();
        let reply = self.conversation.finish(turn, &response).await?;

        tracing::info!(
            session_key = %session_key,
            elapsed_ms = started.elapsed().as_millis() as u64,
            response_chars = reply.content.chars().count(),
            "Agent replied"
        );
        Ok(reply)
    }
}
