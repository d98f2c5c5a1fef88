//! Agent Client Port - Interface to the external conversational agent.
//!
//! The agent is a command-line tool that answers one prompt per invocation
//! and can resume an earlier conversation by its own session id.
//!
//! # Design
//!
//! - `send` waits for the whole answer
//! - `stream` yields text deltas followed by one `Completed` event
//! - Failures are classified so the HTTP layer can map them (timeout vs. crash)

use std::collections::HashMap;
use std::pin::Pin;

use async_trait::async_trait;
use futures::Stream;
use serde_json::Value;

/// Port for talking to the agent.
#[async_trait]
pub trait AgentClient: Send + Sync {
    /// Run one prompt to completion.
    async fn send(&self, request: AgentRequest) -> Result<AgentResponse, AgentError>;

    /// Run one prompt, yielding output as it is produced.
    async fn stream(&self, request: AgentRequest) -> Result<AgentEventStream, AgentError>;

    /// Version string reported by the agent.
    async fn version(&self) -> Result<String, AgentError>;
}

/// Stream of agent events; the last successful item is `Completed`.
pub type AgentEventStream =
    Pin<Box<dyn Stream<Item = Result<AgentStreamEvent, AgentError>> + Send>>;

/// Request for one agent invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AgentRequest {
    /// Final prompt text, already formatted.
    pub prompt: String,
    /// Agent-side session to continue, if any.
    pub resume_session_id: Option<String>,
}

impl AgentRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            resume_session_id: None,
        }
    }

    pub fn resuming(mut self, agent_session_id: Option<String>) -> Self {
        self.resume_session_id = agent_session_id;
        self
    }
}

/// Result of one agent invocation.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AgentResponse {
    pub content: String,
    pub agent_session_id: Option<String>,
    pub is_error: bool,
    pub cost_usd: Option<f64>,
    pub duration_ms: Option<u64>,
    pub num_turns: Option<u32>,
    /// Unparsed stdout, kept for diagnostics.
    pub raw_output: String,
}

impl AgentResponse {
    pub fn text(content: impl Into<String>) -> Self {
        let content = content.into();
        Self {
            raw_output: content.clone(),
            content,
            ..Self::default()
        }
    }

    pub fn with_agent_session_id(mut self, id: impl Into<String>) -> Self {
        self.agent_session_id = Some(id.into());
        self
    }

    /// Usage figures as a JSON map for reply metadata.
    pub fn metadata(&self) -> HashMap<String, Value> {
        let mut metadata = HashMap::new();
        if let Some(id) = &self.agent_session_id {
            metadata.insert("agent_session_id".to_string(), Value::from(id.clone()));
        }
        if let Some(cost) = self.cost_usd {
            metadata.insert("cost_usd".to_string(), Value::from(cost));
        }
        if let Some(ms) = self.duration_ms {
            metadata.insert("duration_ms".to_string(), Value::from(ms));
        }
        if let Some(turns) = self.num_turns {
            metadata.insert("num_turns".to_string(), Value::from(turns));
        }
        metadata
    }
}

/// Item of a streaming invocation.
#[derive(Debug, Clone, PartialEq)]
pub enum AgentStreamEvent {
    /// A piece of assistant text.
    Delta(String),
    /// The invocation finished; carries the full answer.
    Completed(AgentResponse),
}

/// Errors raised while invoking the agent.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum AgentError {
    #[error("Failed to start agent: {0}")]
    Spawn(String),

    #[error("Agent exited with code {exit_code:?}: {stderr}")]
    Execution {
        exit_code: Option<i32>,
        stderr: String,
    },

    #[error("Agent timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    #[error("Failed to parse agent output: {0}")]
    Parse(String),

    #[error("Agent reported an error: {0}")]
    Reported(String),
}

impl AgentError {
    pub fn execution(exit_code: Option<i32>, stderr: impl Into<String>) -> Self {
        AgentError::Execution {
            exit_code,
            stderr: stderr.into(),
        }
    }

    pub fn is_timeout(&self) -> bool {
        matches!(self, AgentError::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_builder_sets_resume_id() {
        let req = AgentRequest::new("hi").resuming(Some("abc".to_string()));
        assert_eq!(req.prompt, "hi");
        assert_eq!(req.resume_session_id.as_deref(), Some("abc"));
    }

    #[test]
    fn metadata_includes_only_known_fields() {
        let mut resp = AgentResponse::text("ok").with_agent_session_id("abc");
        resp.num_turns = Some(2);

        let meta = resp.metadata();
        assert_eq!(meta.get("agent_session_id"), Some(&Value::from("abc")));
        assert_eq!(meta.get("num_turns"), Some(&Value::from(2)));
        assert!(!meta.contains_key("cost_usd"));
    }

    #[test]
    fn error_messages_are_descriptive() {
        assert_eq!(
            AgentError::Timeout { timeout_secs: 30 }.to_string(),
            "Agent timed out after 30s"
        );
        assert!(AgentError::execution(Some(1), "boom").to_string().contains("boom"));
        assert!(AgentError::Timeout { timeout_secs: 1 }.is_timeout());
    }
}
