//! Domain layer containing the gateway's core types and logic.
//!
//! # Module Organization
//!
//! - `foundation` - Shared primitives (error codes, validation, state machines)
//! - `debounce` - Per-session message coalescing buffer
//! - `session` - Conversation records and session-key derivation
//! - `formatter` - Prompt decoration with sender context
//! - `task` - Background task lifecycle

pub mod debounce;
pub mod formatter;
pub mod foundation;
pub mod session;
pub mod task;
