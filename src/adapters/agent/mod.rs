//! Agent adapters - implementations of the AgentClient port.
//!
//! - `CliAgentClient` - runs the agent binary as a subprocess
//! - `MockAgentClient` - scripted replies for tests

mod cli_client;
mod mock_client;
mod output_parser;

pub use cli_client::{compose_system_prompt, CliAgentClient, CliAgentConfig};
pub use mock_client::{MockAgentClient, MOCK_AGENT_SESSION_ID};
pub use output_parser::{parse_output, OutputFormat, StreamAccumulator};
