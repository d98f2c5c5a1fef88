//! Application configuration module
//!
//! This module provides type-safe configuration loading from an optional
//! config file and environment variables using the `config` and `dotenvy`
//! crates. Environment variables use the `AGENT_GATEWAY` prefix and nested
//! values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use agent_gateway::config::AppConfig;
//!
//! let config = AppConfig::load(None).expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}:{}", config.server.host, config.server.port);
//! ```

mod agent;
mod debounce;
mod error;
mod security;
mod server;
mod session;
mod tasks;

pub use agent::{AgentConfig, PermissionMode};
pub use debounce::DebounceConfig;
pub use error::{ConfigError, ValidationError};
pub use security::SecurityConfig;
pub use server::{Environment, LogFormat, ResponseMode, ServerConfig};
pub use session::{SessionBackend, SessionConfig};
pub use tasks::TasksConfig;

use serde::Deserialize;
use std::path::Path;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "AGENT_GATEWAY";

/// Root application configuration
///
/// Every section has defaults, so an empty environment yields a runnable
/// configuration. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Server configuration (bind address, logging, CORS)
    #[serde(default)]
    pub server: ServerConfig,

    /// Agent CLI configuration
    #[serde(default)]
    pub agent: AgentConfig,

    /// Session store configuration
    #[serde(default)]
    pub session: SessionConfig,

    /// Message debounce configuration
    #[serde(default)]
    pub debounce: DebounceConfig,

    /// API key and user allow-list
    #[serde(default)]
    pub security: SecurityConfig,

    /// Background task configuration
    #[serde(default)]
    pub tasks: TasksConfig,
}

impl AppConfig {
    /// Load configuration from an optional file and environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `path` if given (format chosen by extension: YAML, TOML, JSON)
    /// 3. Overlays environment variables with `AGENT_GATEWAY` prefix
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `AGENT_GATEWAY__SERVER__PORT=8000` -> `server.port = 8000`
    /// - `AGENT_GATEWAY__DEBOUNCE__ENABLED=true` -> `debounce.enabled = true`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file cannot be read or values cannot be
    /// parsed into expected types.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let mut builder = config::Config::builder();
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).required(true));
        }

        let config = builder
            .add_source(
                config::Environment::default()
                    .prefix(ENV_PREFIX)
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.agent.validate()?;
        self.session.validate()?;
        self.debounce.validate()?;
        self.tasks.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
