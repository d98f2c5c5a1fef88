//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the application to external systems:
//! - `agent` - agent CLI subprocess client (and a mock for tests)
//! - `session_store` - in-memory, file and Redis session stores
//! - `http` - axum REST API

pub mod agent;
pub mod http;
pub mod session_store;
