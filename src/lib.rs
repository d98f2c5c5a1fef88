//! agent-gateway - HTTP gateway for a conversational agent CLI
//!
//! This crate wraps an agent command-line tool with multi-user sessions,
//! message formatting, and sync, streaming and async chat endpoints. Rapid
//! messages from one session can be coalesced by a debounce buffer before
//! they reach the agent.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;
pub mod telemetry;
