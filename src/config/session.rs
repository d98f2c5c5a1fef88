//! Session store configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;

/// Session store configuration
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// Storage backend
    #[serde(default)]
    pub store: SessionBackend,

    /// Directory for the file backend
    #[serde(default = "default_storage_dir")]
    pub storage_dir: PathBuf,

    /// Redis connection URL for the redis backend
    #[serde(default = "default_redis_url")]
    pub redis_url: String,

    /// Key prefix for the redis backend
    #[serde(default = "default_redis_prefix")]
    pub redis_prefix: String,

    /// Idle session lifetime in seconds; 0 keeps sessions forever
    #[serde(default = "default_ttl")]
    pub ttl_secs: u64,
}

/// Session storage backend
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    #[default]
    File,
    Redis,
}

impl SessionConfig {
    /// Idle lifetime, `None` when sessions never expire
    pub fn ttl(&self) -> Option<Duration> {
        (self.ttl_secs > 0).then(|| Duration::from_secs(self.ttl_secs))
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.store == SessionBackend::Redis
            && !self.redis_url.starts_with("redis://")
            && !self.redis_url.starts_with("rediss://")
        {
            return Err(ValidationError::InvalidRedisUrl);
        }
        Ok(())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            store: SessionBackend::default(),
            storage_dir: default_storage_dir(),
            redis_url: default_redis_url(),
            redis_prefix: default_redis_prefix(),
            ttl_secs: default_ttl(),
        }
    }
}

fn default_storage_dir() -> PathBuf {
    PathBuf::from(".sessions")
}

fn default_redis_url() -> String {
    "redis://localhost:6379".to_string()
}

fn default_redis_prefix() -> String {
    "agent_session:".to_string()
}

fn default_ttl() -> u64 {
    3600
}
