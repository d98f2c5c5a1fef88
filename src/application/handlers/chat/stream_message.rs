//! StreamMessageHandler - chat turn with incremental output.
//!
//! The returned stream yields text deltas as the agent produces them and
//! ends with exactly one `Done` or `Failed` event. History is persisted
//! before `Done` is emitted, the same way the synchronous path does it.

use std::pin::Pin;
use std::sync::Arc;

use futures::stream::{self, Stream, StreamExt};

use super::conversation::{ChatCommand, ChatSettings, ChatTurn, Conversation};
use super::errors::ChatError;
use crate::application::SessionManager;
use crate::domain::session::ChatReply;
use crate::ports::{AgentClient, AgentEventStream, AgentStreamEvent};

/// Event of a streaming chat turn.
#[derive(Debug, Clone, PartialEq)]
pub enum ChatStreamEvent {
    Delta(String),
    Done(ChatReply),
    Failed(String),
}

pub type ChatEventStream = Pin<Box<dyn Stream<Item = ChatStreamEvent> + Send>>;

/// Sends one message and streams the answer.
#[derive(Clone)]
pub struct StreamMessageHandler {
    conversation: Conversation,
    agent: Arc<dyn AgentClient>,
}

enum StreamState {
    Running {
        events: AgentEventStream,
        conversation: Conversation,
        turn: ChatTurn,
    },
    Finished,
}

impl StreamMessageHandler {
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

    /// Starts the turn. Errors before the agent starts are returned
    /// directly; later failures arrive as a `Failed` event.
    pub async fn handle(&self, cmd: ChatCommand) -> Result<ChatEventStream, ChatError> {
        let turn = self.conversation.begin(&cmd).await?;
        tracing::info!(
            session_key = %turn.session_key,
            user_id = %turn.user_id,
            "Streaming message to agent"
        );

        let events = self.agent.stream(turn.request.clone()).await?;
        let state = StreamState::Running {
            events,
            conversation: self.conversation.clone(),
            turn,
        };

        Ok(Box::pin(stream::unfold(state, next_event)))
    }
}

async fn next_event(state: StreamState) -> Option<(ChatStreamEvent, StreamState)> {
    let StreamState::Running {
        mut events,
        conversation,
        turn,
    } = state
    else {
        return None;
    };

    let failed = |session_key: &str, message: String| {
        tracing::error!(session_key, error = %message, "Streaming turn failed");
        Some((ChatStreamEvent::Failed(message), StreamState::Finished))
    };

    match events.next().await {
        Some(Ok(AgentStreamEvent::Delta(text))) => Some((
            ChatStreamEvent::Delta(text),
            StreamState::Running {
                events,
                conversation,
                turn,
            },
        )),
        Some(Ok(AgentStreamEvent::Completed(response))) => {
            if response.is_error {
                return failed(&turn.session_key, response.content);
            }
            let session_key = turn.session_key.clone();
            match conversation.finish(turn, &response).await {
                Ok(reply) => Some((ChatStreamEvent::Done(reply), StreamState::Finished)),
                Err(e) => failed(&session_key, e.to_string()),
            }
        }
        Some(Err(e)) => failed(&turn.session_key, e.to_string()),
        None => failed(
            &turn.session_key,
            "Agent stream ended without a result".to_string(),
        ),
    }
}
