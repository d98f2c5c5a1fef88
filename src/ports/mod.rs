//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the application and the outside world. Adapters implement these ports.
//!
//! - `AgentClient` - the external conversational agent
//! - `SessionStore` - persistence for conversation sessions

mod agent_client;
mod session_store;

pub use agent_client::{
    AgentClient, AgentError, AgentEventStream, AgentRequest, AgentResponse, AgentStreamEvent,
};
pub use session_store::{SessionStore, SessionStoreError};
