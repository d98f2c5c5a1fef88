//! CLI Agent Client - runs the agent binary as a subprocess per request.
//!
//! # Configuration
//!
//! ```ignore
//! let config = CliAgentConfig::new("claude")
//!     .with_working_directory("/srv/agent")
//!     .with_timeout(Duration::from_secs(300));
//!
//! let client = CliAgentClient::new(config);
//! ```
//!
//! # Invocation
//!
//! Each call runs `<binary> -p <prompt> --output-format <fmt> ...` and parses
//! stdout. Streaming always uses `stream-json` so that assistant text can be
//! forwarded line by line. The child is killed when the timeout elapses or
//! when the caller drops the stream.

use std::path::{Path, PathBuf};
use std::process::Stdio;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use tokio::io::{AsyncBufReadExt, AsyncReadExt, BufReader};
use tokio::process::{Child, Command};
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

use super::output_parser::{parse_output, OutputFormat, StreamAccumulator};
use crate::ports::{
    AgentClient, AgentError, AgentEventStream, AgentRequest, AgentResponse, AgentStreamEvent,
};

const VERSION_TIMEOUT: Duration = Duration::from_secs(10);
const STREAM_CHANNEL_CAPACITY: usize = 64;

/// Configuration for the CLI agent client.
#[derive(Debug, Clone)]
pub struct CliAgentConfig {
    /// Executable name or path.
    pub binary: String,
    /// Directory the agent runs in; also searched for prompt files.
    pub working_directory: Option<PathBuf>,
    pub output_format: OutputFormat,
    pub permission_mode: Option<String>,
    pub model: Option<String>,
    pub allowed_tools: Vec<String>,
    pub append_system_prompt: Option<String>,
    /// Upper bound for one invocation.
    pub timeout: Duration,
    pub disable_prompt_caching: bool,
}

impl CliAgentConfig {
    pub fn new(binary: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            working_directory: None,
            output_format: OutputFormat::Json,
            permission_mode: None,
            model: None,
            allowed_tools: Vec::new(),
            append_system_prompt: None,
            timeout: Duration::from_secs(300),
            disable_prompt_caching: false,
        }
    }

    pub fn with_working_directory(mut self, dir: impl Into<PathBuf>) -> Self {
        self.working_directory = Some(dir.into());
        self
    }

    pub fn with_output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    pub fn with_permission_mode(mut self, mode: impl Into<String>) -> Self {
        self.permission_mode = Some(mode.into());
        self
    }

    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    pub fn with_allowed_tools(mut self, tools: Vec<String>) -> Self {
        self.allowed_tools = tools;
        self
    }

    pub fn with_append_system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.append_system_prompt = Some(prompt.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_prompt_caching_disabled(mut self, disabled: bool) -> Self {
        self.disable_prompt_caching = disabled;
        self
    }
}

/// Agent client backed by the CLI binary.
pub struct CliAgentClient {
    config: CliAgentConfig,
    /// Composed once at construction from config and prompt files.
    system_prompt: Option<String>,
}

impl CliAgentClient {
    pub fn new(config: CliAgentConfig) -> Self {
        let system_prompt = compose_system_prompt(
            config.working_directory.as_deref(),
            config.append_system_prompt.as_deref(),
        );
        Self {
            config,
            system_prompt,
        }
    }

    pub fn system_prompt(&self) -> Option<&str> {
        self.system_prompt.as_deref()
    }

    /// Arguments for one invocation, excluding the binary itself.
    fn build_args(&self, request: &AgentRequest, format: OutputFormat) -> Vec<String> {
        let mut args = vec![
            "-p".to_string(),
            request.prompt.clone(),
            "--output-format".to_string(),
            format.as_arg().to_string(),
        ];

        // The CLI refuses stream-json in print mode without --verbose.
        if format == OutputFormat::StreamJson {
            args.push("--verbose".to_string());
        }
        if let Some(id) = &request.resume_session_id {
            args.push("--resume".to_string());
            args.push(id.clone());
        }
        if let Some(model) = &self.config.model {
            args.push("--model".to_string());
            args.push(model.clone());
        }
        if let Some(mode) = &self.config.permission_mode {
            args.push("--permission-mode".to_string());
            args.push(mode.clone());
        }
        if !self.config.allowed_tools.is_empty() {
            args.push("--allowedTools".to_string());
            args.push(self.config.allowed_tools.join(","));
        }
        if let Some(prompt) = &self.system_prompt {
            args.push("--append-system-prompt".to_string());
            args.push(prompt.clone());
        }
        args
    }

    fn command(&self, args: &[String]) -> Command {
        let mut cmd = Command::new(&self.config.binary);
        cmd.args(args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        if let Some(dir) = &self.config.working_directory {
            cmd.current_dir(dir);
        }
        if self.config.disable_prompt_caching {
            cmd.env("DISABLE_PROMPT_CACHING", "1");
        }
        cmd
    }

    fn spawn(&self, args: &[String]) -> Result<Child, AgentError> {
        self.command(args).spawn().map_err(|e| {
            AgentError::Spawn(format!("{}: {}", self.config.binary, e))
        })
    }

    fn timeout_error(&self) -> AgentError {
        AgentError::Timeout {
            timeout_secs: self.config.timeout.as_secs(),
        }
    }
}

#[async_trait]
impl AgentClient for CliAgentClient {
    async fn send(&self, request: AgentRequest) -> Result<AgentResponse, AgentError> {
        let format = self.config.output_format;
        let args = self.build_args(&request, format);
        let started = Instant::now();

        tracing::debug!(
            binary = %self.config.binary,
            resume = request.resume_session_id.is_some(),
            prompt_chars = request.prompt.chars().count(),
            "Invoking agent"
        );

        let child = self.spawn(&args)?;
        // Dropping the future on timeout drops the child, which kills it.
        let output = tokio::time::timeout(self.config.timeout, child.wait_with_output())
            .await
            .map_err(|_| self.timeout_error())?
            .map_err(|e| AgentError::Spawn(e.to_string()))?;

        let stdout = String::from_utf8_lossy(&output.stdout);
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            tracing::warn!(exit_code = ?output.status.code(), %stderr, "Agent exited with failure");
            return Err(AgentError::execution(output.status.code(), stderr));
        }

        let response = parse_output(format, &stdout)?;
        tracing::info!(
            elapsed_ms = started.elapsed().as_millis() as u64,
            agent_session_id = ?response.agent_session_id,
            "Agent invocation finished"
        );

        if response.is_error {
            return Err(AgentError::Reported(response.content));
        }
        Ok(response)
    }

    async fn stream(&self, request: AgentRequest) -> Result<AgentEventStream, AgentError> {
        let args = self.build_args(&request, OutputFormat::StreamJson);
        let mut child = self.spawn(&args)?;

        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| AgentError::Spawn("stdout not captured".to_string()))?;
        let mut stderr = child
            .stderr
            .take()
            .ok_or_else(|| AgentError::Spawn("stderr not captured".to_string()))?;

        let (tx, rx) = mpsc::channel(STREAM_CHANNEL_CAPACITY);
        let timeout = self.config.timeout;
        let timeout_err = self.timeout_error();

        tokio::spawn(async move {
            let stderr_task = tokio::spawn(async move {
                let mut buf = String::new();
                let _ = stderr.read_to_string(&mut buf).await;
                buf
            });

            let pump = async {
                let mut lines = BufReader::new(stdout).lines();
                let mut acc = StreamAccumulator::default();
                let mut completed = false;
                while let Ok(Some(line)) = lines.next_line().await {
                    if let Some(event) = acc.push_line(&line) {
                        completed |= matches!(event, AgentStreamEvent::Completed(_));
                        if tx.send(Ok(event)).await.is_err() {
                            // Receiver went away; stop reading and let the child die.
                            return None;
                        }
                    }
                }
                Some((acc, completed))
            };

            let outcome = match tokio::time::timeout(timeout, pump).await {
                Ok(outcome) => outcome,
                Err(_) => {
                    let _ = child.kill().await;
                    let _ = tx.send(Err(timeout_err)).await;
                    return;
                }
            };
            let Some((acc, completed)) = outcome else {
                let _ = child.kill().await;
                return;
            };

            let status = match child.wait().await {
                Ok(status) => status,
                Err(e) => {
                    let _ = tx.send(Err(AgentError::Spawn(e.to_string()))).await;
                    return;
                }
            };

            if !status.success() {
                let stderr = stderr_task.await.unwrap_or_default().trim().to_string();
                tracing::warn!(exit_code = ?status.code(), %stderr, "Streaming agent exited with failure");
                let _ = tx.send(Err(AgentError::execution(status.code(), stderr))).await;
                return;
            }

            if !completed {
                let _ = tx
                    .send(Ok(AgentStreamEvent::Completed(acc.finish())))
                    .await;
            }
        });

        Ok(Box::pin(ReceiverStream::new(rx)))
    }

    async fn version(&self) -> Result<String, AgentError> {
        let child = self.spawn(&["--version".to_string()])?;
        let output = tokio::time::timeout(VERSION_TIMEOUT, child.wait_with_output())
            .await
            .map_err(|_| AgentError::Timeout {
                timeout_secs: VERSION_TIMEOUT.as_secs(),
            })?
            .map_err(|e| AgentError::Spawn(e.to_string()))?;

        if !output.status.success() {
            return Err(AgentError::execution(
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim().to_string(),
            ));
        }
        Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
    }
}

/// Builds the appended system prompt.
///
/// `.claude/CLAUDE.md` or `CLAUDE.md` (first found) goes before the
/// configured prompt and `SYSTEM_PROMPT.md` after it. Unreadable files are
/// skipped.
pub fn compose_system_prompt(working_dir: Option<&Path>, configured: Option<&str>) -> Option<String> {
    let mut parts: Vec<String> = Vec::new();

    if let Some(dir) = working_dir {
        let project_prompt = [dir.join(".claude").join("CLAUDE.md"), dir.join("CLAUDE.md")]
            .into_iter()
            .find(|path| path.is_file())
            .and_then(|path| read_prompt_file(&path));
        parts.extend(project_prompt);
    }

    if let Some(text) = configured.filter(|s| !s.is_empty()) {
        parts.push(text.to_string());
    }

    if let Some(dir) = working_dir {
        parts.extend(read_prompt_file(&dir.join("SYSTEM_PROMPT.md")));
    }

    if parts.is_empty() {
        None
    } else {
        Some(parts.join("\n\n"))
    }
}

fn read_prompt_file(path: &Path) -> Option<String> {
    match std::fs::read_to_string(path) {
        Ok(content) => Some(content),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
        Err(e) => {
            tracing::warn!(path = %path.display(), error = %e, "Skipping unreadable prompt file");
            None
        }
    }
}
