//! Agent CLI configuration

use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;

use super::error::ValidationError;
use crate::adapters::agent::{CliAgentConfig, OutputFormat};
use crate::application::{ChatSettings, ContextMode};
use crate::domain::formatter::MessageFormatter;

/// Agent CLI configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AgentConfig {
    /// Agent executable name or path
    #[serde(default = "default_binary")]
    pub binary: String,

    /// Directory the agent runs in
    pub working_directory: Option<PathBuf>,

    /// Output format requested from the CLI
    #[serde(default)]
    pub output_format: OutputFormat,

    /// Tool permission mode passed to the CLI
    #[serde(default)]
    pub permission_mode: PermissionMode,

    /// Model override
    pub model: Option<String>,

    /// Allowed tools (comma-separated)
    pub allowed_tools: Option<String>,

    /// Extra system prompt text
    pub append_system_prompt: Option<String>,

    /// Per-invocation timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Sets `DISABLE_PROMPT_CACHING=1` for the agent process
    #[serde(default = "default_true")]
    pub disable_prompt_caching: bool,

    /// Formatter preset name or template containing `{message}`
    pub message_formatter: Option<String>,

    /// How earlier turns reach the agent
    #[serde(default)]
    pub context_mode: ContextMode,

    /// Turns inlined into the prompt in `history` mode
    #[serde(default = "default_max_history_turns")]
    pub max_history_turns: usize,
}

/// Permission mode accepted by the agent CLI
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
pub enum PermissionMode {
    #[serde(rename = "default")]
    Default,
    #[default]
    #[serde(rename = "acceptEdits")]
    AcceptEdits,
    #[serde(rename = "bypassPermissions")]
    BypassPermissions,
    #[serde(rename = "plan")]
    Plan,
}

impl PermissionMode {
    pub fn as_arg(&self) -> &'static str {
        match self {
            PermissionMode::Default => "default",
            PermissionMode::AcceptEdits => "acceptEdits",
            PermissionMode::BypassPermissions => "bypassPermissions",
            PermissionMode::Plan => "plan",
        }
    }
}

impl AgentConfig {
    /// Get timeout as Duration
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    /// Get allowed tools as a vector
    pub fn allowed_tools_list(&self) -> Vec<String> {
        self.allowed_tools
            .as_ref()
            .map(|s| {
                s.split(',')
                    .map(|s| s.trim().to_string())
                    .filter(|s| !s.is_empty())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Resolve the configured message formatter
    pub fn formatter(&self) -> Result<Option<MessageFormatter>, ValidationError> {
        match self.message_formatter.as_deref().map(str::trim) {
            None | Some("") => Ok(None),
            Some(name) => MessageFormatter::parse(name)
                .map(Some)
                .ok_or_else(|| ValidationError::UnknownFormatter(name.to_string())),
        }
    }

    /// Build the subprocess client configuration
    pub fn cli_config(&self) -> CliAgentConfig {
        let mut config = CliAgentConfig::new(self.binary.clone())
            .with_output_format(self.output_format)
            .with_permission_mode(self.permission_mode.as_arg())
            .with_allowed_tools(self.allowed_tools_list())
            .with_timeout(self.timeout())
            .with_prompt_caching_disabled(self.disable_prompt_caching);
        if let Some(dir) = &self.working_directory {
            config = config.with_working_directory(dir.clone());
        }
        if let Some(model) = &self.model {
            config = config.with_model(model.clone());
        }
        if let Some(prompt) = &self.append_system_prompt {
            config = config.with_append_system_prompt(prompt.clone());
        }
        config
    }

    /// Settings shared by the chat handlers
    pub fn chat_settings(&self) -> Result<ChatSettings, ValidationError> {
        Ok(ChatSettings {
            formatter: self.formatter()?,
            context_mode: self.context_mode,
            max_history_turns: self.max_history_turns,
        })
    }

    /// Validate agent configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.binary.trim().is_empty() {
            return Err(ValidationError::MissingRequired("agent.binary"));
        }
        if self.timeout_secs == 0 || self.timeout_secs > 3600 {
            return Err(ValidationError::InvalidAgentTimeout);
        }
        self.formatter()?;
        Ok(())
    }
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            binary: default_binary(),
            working_directory: None,
            output_format: OutputFormat::default(),
            permission_mode: PermissionMode::default(),
            model: None,
            allowed_tools: None,
            append_system_prompt: None,
            timeout_secs: default_timeout(),
            disable_prompt_caching: default_true(),
            message_formatter: None,
            context_mode: ContextMode::default(),
            max_history_turns: default_max_history_turns(),
        }
    }
}

fn default_binary() -> String {
    "claude".to_string()
}

fn default_timeout() -> u64 {
    300
}

fn default_true() -> bool {
    true
}

fn default_max_history_turns() -> usize {
    10
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_agent_defaults() {
        let config = AgentConfig::default();
        assert_eq!(config.binary, "claude");
        assert_eq!(config.output_format, OutputFormat::Json);
        assert_eq!(config.permission_mode, PermissionMode::AcceptEdits);
        assert_eq!(config.timeout(), Duration::from_secs(300));
        assert!(config.disable_prompt_caching);
        assert_eq!(config.context_mode, ContextMode::Resume);
        assert_eq!(config.max_history_turns, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_timeout_bounds() {
        let zero = AgentConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert_eq!(zero.validate(), Err(ValidationError::InvalidAgentTimeout));

        let huge = AgentConfig {
            timeout_secs: 3601,
            ..Default::default()
        };
        assert_eq!(huge.validate(), Err(ValidationError::InvalidAgentTimeout));
    }

    #[test]
    fn test_formatter_resolution() {
        let preset = AgentConfig {
            message_formatter: Some("platform".to_string()),
            ..Default::default()
        };
        assert_eq!(preset.formatter(), Ok(Some(MessageFormatter::Platform)));

        let unknown = AgentConfig {
            message_formatter: Some("fancy".to_string()),
            ..Default::default()
        };
        assert_eq!(
            unknown.validate(),
            Err(ValidationError::UnknownFormatter("fancy".to_string()))
        );
    }

    #[test]
    fn test_cli_config_carries_settings() {
        let config = AgentConfig {
            model: Some("sonnet".to_string()),
            allowed_tools: Some("Read, Grep".to_string()),
            permission_mode: PermissionMode::Plan,
            ..Default::default()
        };
        let cli = config.cli_config();
        assert_eq!(cli.binary, "claude");
        assert_eq!(cli.model.as_deref(), Some("sonnet"));
        assert_eq!(cli.allowed_tools, vec!["Read", "Grep"]);
        assert_eq!(cli.permission_mode.as_deref(), Some("plan"));
        assert!(cli.disable_prompt_caching);
    }

    #[test]
    fn test_chat_settings_follow_config() {
        let config = AgentConfig {
            message_formatter: Some("simple".to_string()),
            context_mode: ContextMode::History,
            max_history_turns: 3,
            ..Default::default()
        };
        let settings = config.chat_settings().unwrap();
        assert_eq!(settings.formatter, Some(MessageFormatter::Simple));
        assert_eq!(settings.context_mode, ContextMode::History);
        assert_eq!(settings.max_history_turns, 3);
    }
}
