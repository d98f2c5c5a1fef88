//! Background task configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::application::TaskManagerConfig;

/// Background task configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TasksConfig {
    /// Tasks allowed to run at once
    #[serde(default = "default_max_concurrent")]
    pub max_concurrent: usize,

    /// Upper bound for one task in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// How long finished tasks stay queryable, in seconds
    #[serde(default = "default_retention")]
    pub retention_secs: u64,

    /// Seconds between sweeps of finished tasks and expired sessions
    #[serde(default = "default_cleanup_interval")]
    pub cleanup_interval_secs: u64,
}

impl TasksConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn retention(&self) -> Duration {
        Duration::from_secs(self.retention_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }

    pub fn task_manager_config(&self) -> TaskManagerConfig {
        TaskManagerConfig {
            max_concurrent: self.max_concurrent,
            task_timeout: self.timeout(),
        }
    }

    /// Validate task configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.max_concurrent == 0 {
            return Err(ValidationError::InvalidConcurrency);
        }
        if self.timeout_secs == 0 {
            return Err(ValidationError::InvalidTaskTimeout);
        }
        Ok(())
    }
}

impl Default for TasksConfig {
    fn default() -> Self {
        Self {
            max_concurrent: default_max_concurrent(),
            timeout_secs: default_timeout(),
            retention_secs: default_retention(),
            cleanup_interval_secs: default_cleanup_interval(),
        }
    }
}

fn default_max_concurrent() -> usize {
    10
}

fn default_timeout() -> u64 {
    600
}

fn default_retention() -> u64 {
    3600
}

fn default_cleanup_interval() -> u64 {
    300
}
