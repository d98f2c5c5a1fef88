//! Parsing of the agent CLI's stdout.
//!
//! The CLI prints either plain text, a single JSON result object, or (in
//! `stream-json` mode) one JSON event per line:
//!
//! ```text
//! {"type":"system","subtype":"init","session_id":"..."}
//! {"type":"assistant","message":{"content":[{"type":"text","text":"Hi"}]}}
//! {"type":"result","subtype":"success","result":"Hi","session_id":"...","is_error":false}
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ports::{AgentError, AgentResponse, AgentStreamEvent};

/// Output format requested from the CLI via `--output-format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum OutputFormat {
    #[serde(rename = "text")]
    Text,
    #[default]
    #[serde(rename = "json")]
    Json,
    #[serde(rename = "stream-json")]
    StreamJson,
}

impl OutputFormat {
    pub fn as_arg(&self) -> &'static str {
        match self {
            OutputFormat::Text => "text",
            OutputFormat::Json => "json",
            OutputFormat::StreamJson => "stream-json",
        }
    }
}

/// Final `result` object printed by the CLI.
#[derive(Debug, Deserialize)]
struct ResultMessage {
    #[serde(default)]
    result: Option<String>,
    #[serde(default)]
    session_id: Option<String>,
    #[serde(default)]
    is_error: bool,
    #[serde(default)]
    total_cost_usd: Option<f64>,
    #[serde(default)]
    duration_ms: Option<u64>,
    #[serde(default)]
    num_turns: Option<u32>,
}

impl ResultMessage {
    fn into_response(self, raw_output: &str) -> AgentResponse {
        AgentResponse {
            content: self.result.unwrap_or_default(),
            agent_session_id: self.session_id,
            is_error: self.is_error,
            cost_usd: self.total_cost_usd,
            duration_ms: self.duration_ms,
            num_turns: self.num_turns,
            raw_output: raw_output.to_string(),
        }
    }
}

/// Parses the complete stdout of a finished invocation.
pub fn parse_output(format: OutputFormat, stdout: &str) -> Result<AgentResponse, AgentError> {
    match format {
        OutputFormat::Text => Ok(AgentResponse::text(stdout.trim())),
        OutputFormat::Json => parse_json_result(stdout),
        OutputFormat::StreamJson => {
            let mut acc = StreamAccumulator::default();
            let mut completed = None;
            for line in stdout.lines() {
                if let Some(AgentStreamEvent::Completed(response)) = acc.push_line(line) {
                    completed = Some(response);
                }
            }
            Ok(completed.unwrap_or_else(|| acc.finish()))
        }
    }
}

/// JSON mode prints one result object; verbose CLIs print an array of
/// events instead, in which case the last `result` entry wins.
fn parse_json_result(stdout: &str) -> Result<AgentResponse, AgentError> {
    let trimmed = stdout.trim();
    let value: Value =
        serde_json::from_str(trimmed).map_err(|e| AgentError::Parse(e.to_string()))?;

    let result = match value {
        Value::Array(items) => items
            .into_iter()
            .rev()
            .find(|item| item.get("type").and_then(Value::as_str) == Some("result"))
            .ok_or_else(|| AgentError::Parse("no result entry in output".to_string()))?,
        other @ Value::Object(_) => other,
        other => {
            return Err(AgentError::Parse(format!(
                "expected a JSON object, got {}",
                other
            )))
        }
    };

    let message: ResultMessage =
        serde_json::from_value(result).map_err(|e| AgentError::Parse(e.to_string()))?;
    Ok(message.into_response(trimmed))
}

/// Incremental state for `stream-json` output.
#[derive(Debug, Default)]
pub struct StreamAccumulator {
    session_id: Option<String>,
    text: String,
    raw: String,
}

impl StreamAccumulator {
    /// Feeds one stdout line, returning the event it produced, if any.
    ///
    /// Blank, malformed and unknown lines are skipped.
    pub fn push_line(&mut self, line: &str) -> Option<AgentStreamEvent> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }
        self.raw.push_str(line);
        self.raw.push('\n');

        let value: Value = match serde_json::from_str(line) {
            Ok(value) => value,
            Err(e) => {
                tracing::debug!(error = %e, "Skipping non-JSON agent output line");
                return None;
            }
        };

        if let Some(id) = value.get("session_id").and_then(Value::as_str) {
            self.session_id = Some(id.to_string());
        }

        match value.get("type").and_then(Value::as_str) {
            Some("assistant") => {
                let text = assistant_text(&value);
                if text.is_empty() {
                    return None;
                }
                self.text.push_str(&text);
                Some(AgentStreamEvent::Delta(text))
            }
            Some("result") => {
                let message: ResultMessage = serde_json::from_value(value).ok()?;
                let mut response = message.into_response(&self.raw);
                if response.content.is_empty() {
                    response.content = self.text.clone();
                }
                if response.agent_session_id.is_none() {
                    response.agent_session_id = self.session_id.clone();
                }
                Some(AgentStreamEvent::Completed(response))
            }
            _ => None,
        }
    }

    /// Builds a response from what was seen when no `result` line arrived.
    pub fn finish(self) -> AgentResponse {
        AgentResponse {
            content: self.text,
            agent_session_id: self.session_id,
            raw_output: self.raw,
            ..AgentResponse::default()
        }
    }
}

fn assistant_text(value: &Value) -> String {
    value
        .pointer("/message/content")
        .and_then(Value::as_array)
        .map(|blocks| {
            blocks
                .iter()
                .filter_map(|block| match block {
                    Value::String(s) => Some(s.as_str()),
                    other => other.get("text").and_then(Value::as_str),
                })
                .collect::<String>()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_mode_trims_stdout() {
        let response = parse_output(OutputFormat::Text, "  Hello there\n").unwrap();
        assert_eq!(response.content, "Hello there");
        assert!(response.agent_session_id.is_none());
    }

    #[test]
    fn json_mode_reads_result_object() {
        let stdout = r#"{"type":"result","subtype":"success","result":"4","session_id":"abc-123","is_error":false,"total_cost_usd":0.01,"duration_ms":1200,"num_turns":1}"#;

        let response = parse_output(OutputFormat::Json, stdout).unwrap();

        assert_eq!(response.content, "4");
        assert_eq!(response.agent_session_id.as_deref(), Some("abc-123"));
        assert!(!response.is_error);
        assert_eq!(response.cost_usd, Some(0.01));
        assert_eq!(response.duration_ms, Some(1200));
        assert_eq!(response.num_turns, Some(1));
    }

    #[test]
    fn json_mode_picks_last_result_from_array() {
        let stdout = r#"[{"type":"system","session_id":"s1"},{"type":"result","result":"done","session_id":"s1"}]"#;
        let response = parse_output(OutputFormat::Json, stdout).unwrap();
        assert_eq!(response.content, "done");
    }

    #[test]
    fn json_mode_flags_reported_errors() {
        let stdout = r#"{"type":"result","result":"quota exceeded","is_error":true}"#;
        let response = parse_output(OutputFormat::Json, stdout).unwrap();
        assert!(response.is_error);
    }

    #[test]
    fn json_mode_rejects_garbage() {
        assert!(matches!(
            parse_output(OutputFormat::Json, "not json"),
            Err(AgentError::Parse(_))
        ));
        assert!(matches!(
            parse_output(OutputFormat::Json, "42"),
            Err(AgentError::Parse(_))
        ));
    }

    #[test]
    fn stream_lines_produce_deltas_then_completion() {
        let mut acc = StreamAccumulator::default();

        assert_eq!(
            acc.push_line(r#"{"type":"system","subtype":"init","session_id":"abc"}"#),
            None
        );
        assert_eq!(
            acc.push_line(
                r#"{"type":"assistant","message":{"content":[{"type":"text","text":"Hel"}]}}"#
            ),
            Some(AgentStreamEvent::Delta("Hel".to_string()))
        );
        acc.push_line(r#"{"type":"assistant","message":{"content":[{"type":"text","text":"lo"}]}}"#);

        match acc.push_line(r#"{"type":"result","subtype":"success","is_error":false}"#) {
            Some(AgentStreamEvent::Completed(response)) => {
                assert_eq!(response.content, "Hello");
                assert_eq!(response.agent_session_id.as_deref(), Some("abc"));
            }
            other => panic!("expected completion, got {:?}", other),
        }
    }

    #[test]
    fn stream_ignores_noise_lines() {
        let mut acc = StreamAccumulator::default();
        assert_eq!(acc.push_line(""), None);
        assert_eq!(acc.push_line("warning: something"), None);
        assert_eq!(acc.push_line(r#"{"type":"user","message":{}}"#), None);
        assert_eq!(
            acc.push_line(r#"{"type":"assistant","message":{"content":[{"type":"tool_use"}]}}"#),
            None
        );
    }

    #[test]
    fn stream_without_result_falls_back_to_accumulated_text() {
        let stdout = concat!(
            r#"{"type":"system","session_id":"xyz"}"#,
            "\n",
            r#"{"type":"assistant","message":{"content":[{"type":"text","text":"partial"}]}}"#,
            "\n"
        );
        let response = parse_output(OutputFormat::StreamJson, stdout).unwrap();
        assert_eq!(response.content, "partial");
        assert_eq!(response.agent_session_id.as_deref(), Some("xyz"));
    }

    #[test]
    fn output_format_round_trips_through_serde() {
        let format: OutputFormat = serde_json::from_str("\"stream-json\"").unwrap();
        assert_eq!(format, OutputFormat::StreamJson);
        assert_eq!(format.as_arg(), "stream-json");
    }
}
