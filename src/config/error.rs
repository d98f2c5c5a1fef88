//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid socket address: {0}")]
    InvalidSocketAddr(String),

    #[error("Agent timeout must be between 1 and 3600 seconds")]
    InvalidAgentTimeout,

    #[error("Unknown message formatter: {0}")]
    UnknownFormatter(String),

    #[error("Debounce window must be a positive number of seconds")]
    InvalidDebounceWindow,

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Task concurrency must be at least 1")]
    InvalidConcurrency,

    #[error("Task timeout must be greater than zero")]
    InvalidTaskTimeout,
}
