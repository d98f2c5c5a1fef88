//! Mock Agent Client for testing.
//!
//! Provides a configurable implementation of the AgentClient port so that
//! handlers and HTTP routes can be tested without the agent binary.
//!
//! # Features
//!
//! - Queued responses, consumed in order
//! - Error injection
//! - Simulated latency
//! - Call recording for verification
//!
//! # Example
//!
//! ```ignore
//! let agent = MockAgentClient::new()
//!     .with_response("Hello!")
//!     .with_delay(Duration::from_millis(100));
//!
//! let response = agent.send(AgentRequest::new("hi")).await?;
//! assert_eq!(response.content, "Hello!");
//! ```

use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use futures::stream::{self, StreamExt};
use tokio::time::sleep;

use crate::ports::{
    AgentClient, AgentError, AgentEventStream, AgentRequest, AgentResponse, AgentStreamEvent,
};

/// Session id handed out when a queued response does not set one.
pub const MOCK_AGENT_SESSION_ID: &str = "mock-agent-session";

#[derive(Debug, Clone)]
enum MockReply {
    Success(AgentResponse),
    Error(AgentError),
}

/// Mock agent for testing.
#[derive(Debug, Clone)]
pub struct MockAgentClient {
    replies: Arc<Mutex<VecDeque<MockReply>>>,
    delay: Duration,
    calls: Arc<Mutex<Vec<AgentRequest>>>,
    version: Option<String>,
}

impl Default for MockAgentClient {
    fn default() -> Self {
        Self::new()
    }
}

impl MockAgentClient {
    pub fn new() -> Self {
        Self {
            replies: Arc::new(Mutex::new(VecDeque::new())),
            delay: Duration::ZERO,
            calls: Arc::new(Mutex::new(Vec::new())),
            version: Some("mock-agent 1.0.0".to_string()),
        }
    }

    /// Queues a successful text reply.
    pub fn with_response(self, content: impl Into<String>) -> Self {
        self.with_agent_response(
            AgentResponse::text(content).with_agent_session_id(MOCK_AGENT_SESSION_ID),
        )
    }

    /// Queues a fully specified reply.
    pub fn with_agent_response(self, response: AgentResponse) -> Self {
        self.replies
            .lock()
            .unwrap()
            .push_back(MockReply::Success(response));
        self
    }

    /// Queues an error.
    pub fn with_error(self, error: AgentError) -> Self {
        self.replies.lock().unwrap().push_back(MockReply::Error(error));
        self
    }

    /// Sets simulated latency per call.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Makes `version()` fail, as if the binary were missing.
    pub fn without_version(mut self) -> Self {
        self.version = None;
        self
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    pub fn get_calls(&self) -> Vec<AgentRequest> {
        self.calls.lock().unwrap().clone()
    }

    /// Records the call and returns the next reply, echoing the prompt when
    /// the queue is empty.
    async fn next_reply(&self, request: AgentRequest) -> MockReply {
        let prompt = request.prompt.clone();
        self.calls.lock().unwrap().push(request);

        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }

        self.replies.lock().unwrap().pop_front().unwrap_or_else(|| {
            MockReply::Success(
                AgentResponse::text(format!("Echo: {}", prompt))
                    .with_agent_session_id(MOCK_AGENT_SESSION_ID),
            )
        })
    }
}

#[async_trait]
impl AgentClient for MockAgentClient {
    async fn send(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        match self.next_reply(request).await {
            MockReply::Success(response) => Ok(response),
            MockReply::Error(err) => Err(err),
        }
    }

    async fn stream(&self, request: AgentRequest) -> Result<AgentEventStream, AgentError> {
        let response = match self.next_reply(request).await {
            MockReply::Success(response) => response,
            MockReply::Error(err) => return Err(err),
        };

        // Split on whitespace boundaries so deltas concatenate back exactly.
        let deltas: Vec<Result<AgentStreamEvent, AgentError>> = response
            .content
            .split_inclusive(' ')
            .map(|chunk| Ok(AgentStreamEvent::Delta(chunk.to_string())))
            .collect();

        let done = stream::once(async move { Ok(AgentStreamEvent::Completed(response)) });
        Ok(Box::pin(stream::iter(deltas).chain(done)))
    }

    async fn version(&self) -> Result<String, AgentError> {
        self.version
            .clone()
            .ok_or_else(|| AgentError::Spawn("mock agent has no version".to_string()))
    }
}
