//! Message debounce configuration

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::debounce::{BufferConfig, DEFAULT_SEPARATOR};

/// Message debounce configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DebounceConfig {
    /// Buffer async chat requests by default
    #[serde(default)]
    pub enabled: bool,

    /// Quiet period in seconds before a session's messages are flushed
    #[serde(default = "default_window")]
    pub window_secs: f64,

    /// Joins buffered messages
    #[serde(default = "default_separator")]
    pub separator: String,
}

impl DebounceConfig {
    /// Get window as Duration, or `None` when `window_secs` is not a usable
    /// positive duration
    pub fn try_window(&self) -> Option<Duration> {
        Duration::try_from_secs_f64(self.window_secs)
            .ok()
            .filter(|window| !window.is_zero())
    }

    /// Get window as Duration; invalid values fall back to the default
    pub fn window(&self) -> Duration {
        self.try_window()
            .unwrap_or_else(|| Duration::from_secs_f64(default_window()))
    }

    pub fn buffer_config(&self) -> BufferConfig {
        BufferConfig::new(self.window()).with_separator(self.separator.clone())
    }

    /// Validate debounce configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.try_window().is_none() {
            return Err(ValidationError::InvalidDebounceWindow);
        }
        Ok(())
    }
}

impl Default for DebounceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            window_secs: default_window(),
            separator: default_separator(),
        }
    }
}

fn default_window() -> f64 {
    2.0
}

fn default_separator() -> String {
    DEFAULT_SEPARATOR.to_string()
}
