//! Message formatting applied to prompts before they reach the agent.
//!
//! Formatting only changes what the agent sees; the conversation history
//! keeps the raw user message.

use std::collections::HashMap;

use serde_json::Value;

const DEFAULT_SOURCE: &str = "unknown platform";

/// How a user message is decorated with sender context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MessageFormatter {
    /// `[user {user_id}] {message}`
    Simple,
    /// Heading naming the user and the `source` platform from metadata.
    Platform,
    /// Context block with every known sender attribute.
    Detailed,
    /// Custom template with `{placeholder}` substitution.
    Template(String),
}

impl MessageFormatter {
    /// Resolves a preset name, or treats the value as a template if it
    /// contains `{message}`.
    pub fn parse(name_or_template: &str) -> Option<Self> {
        match name_or_template.trim() {
            "simple" => Some(MessageFormatter::Simple),
            "platform" => Some(MessageFormatter::Platform),
            "detailed" => Some(MessageFormatter::Detailed),
            other if other.contains("{message}") => {
                Some(MessageFormatter::Template(name_or_template.to_string()))
            }
            _ => None,
        }
    }

    pub fn format(&self, message: &str, user_id: &str, metadata: &HashMap<String, Value>) -> String {
        match self {
            MessageFormatter::Simple => format!("[user {}] {}", user_id, message),
            MessageFormatter::Platform => {
                let source = metadata_text(metadata, "source")
                    .unwrap_or_else(|| DEFAULT_SOURCE.to_string());
                format!("# Message from user {} via {}\n{}", user_id, source, message)
            }
            MessageFormatter::Detailed => detailed(message, user_id, metadata),
            MessageFormatter::Template(template) => {
                render_template(template, message, user_id, metadata)
            }
        }
    }
}

fn detailed(message: &str, user_id: &str, metadata: &HashMap<String, Value>) -> String {
    let mut lines = vec!["# Message context".to_string()];

    if let Some(source) = metadata_text(metadata, "source") {
        lines.push(format!("- Source: {}", source));
    }
    lines.push(format!("- User ID: {}", user_id));
    if let Some(username) = metadata_text(metadata, "username") {
        lines.push(format!("- Display name: {}", username));
    }
    if let Some(timestamp) = metadata_text(metadata, "timestamp") {
        lines.push(format!("- Time: {}", timestamp));
    }

    lines.push(String::new());
    lines.push("User message:".to_string());
    lines.push(message.to_string());
    lines.join("\n")
}

fn render_template(
    template: &str,
    message: &str,
    user_id: &str,
    metadata: &HashMap<String, Value>,
) -> String {
    let lookup = |name: &str| -> Option<String> {
        match name {
            "message" => Some(message.to_string()),
            "user_id" => Some(user_id.to_string()),
            "source" | "username" => Some(metadata_text(metadata, name).unwrap_or_default()),
            other => metadata_text(metadata, other),
        }
    };

    let mut out = String::with_capacity(template.len() + message.len());
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];
        match after.find('}') {
            Some(close) => {
                let name = &after[..close];
                match lookup(name) {
                    Some(value) => out.push_str(&value),
                    None => {
                        out.push('{');
                        out.push_str(name);
                        out.push('}');
                    }
                }
                rest = &after[close + 1..];
            }
            None => {
                out.push_str(&rest[open..]);
                rest = "";
            }
        }
    }
    out.push_str(rest);
    out
}

/// Metadata value as display text; strings are unquoted.
fn metadata_text(metadata: &HashMap<String, Value>, key: &str) -> Option<String> {
    metadata.get(key).map(|value| match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn meta(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn simple_prefixes_user_id() {
        let out = MessageFormatter::Simple.format("who are you", "eric", &HashMap::new());
        assert_eq!(out, "[user eric] who are you");
    }

    #[test]
    fn platform_uses_source_or_default() {
        let with_source = MessageFormatter::Platform.format(
            "hi",
            "eric",
            &meta(&[("source", json!("slack"))]),
        );
        assert_eq!(with_source, "# Message from user eric via slack\nhi");

        let without = MessageFormatter::Platform.format("hi", "eric", &HashMap::new());
        assert_eq!(without, "# Message from user eric via unknown platform\nhi");
    }

    #[test]
    fn detailed_lists_known_fields_only() {
        let out = MessageFormatter::Detailed.format(
            "who are you",
            "eric",
            &meta(&[("source", json!("imessage")), ("username", json!("Eric"))]),
        );
        assert_eq!(
            out,
            "# Message context\n- Source: imessage\n- User ID: eric\n- Display name: Eric\n\nUser message:\nwho are you"
        );
    }

    #[test]
    fn template_substitutes_metadata_and_keeps_unknown() {
        let formatter = MessageFormatter::Template(
            "[{source}/{channel}] {user_id}: {message} {missing}".to_string(),
        );
        let out = formatter.format(
            "hello",
            "eric",
            &meta(&[("source", json!("feishu")), ("channel", json!(7))]),
        );
        assert_eq!(out, "[feishu/7] eric: hello {missing}");
    }

    #[test]
    fn template_defaults_source_and_username_to_empty() {
        let formatter = MessageFormatter::Template("{username}|{source}|{message}".to_string());
        assert_eq!(formatter.format("m", "u", &HashMap::new()), "||m");
    }

    #[test]
    fn template_with_unclosed_brace_is_literal() {
        let formatter = MessageFormatter::Template("{message} {oops".to_string());
        assert_eq!(formatter.format("m", "u", &HashMap::new()), "m {oops");
    }

    #[test]
    fn parse_resolves_presets_and_templates() {
        assert_eq!(MessageFormatter::parse("simple"), Some(MessageFormatter::Simple));
        assert_eq!(MessageFormatter::parse("detailed"), Some(MessageFormatter::Detailed));
        assert_eq!(
            MessageFormatter::parse("From {user_id}: {message}"),
            Some(MessageFormatter::Template("From {user_id}: {message}".to_string()))
        );
        assert_eq!(MessageFormatter::parse("fancy"), None);
    }

    proptest::proptest! {
        #[test]
        fn substituted_values_are_not_rescanned(message in ".*", user in "[a-z0-9_]{1,12}") {
            let formatter = MessageFormatter::Template("{user_id}:{message}".to_string());
            let out = formatter.format(&message, &user, &HashMap::new());
            proptest::prop_assert_eq!(out, format!("{}:{}", user, message));
        }
    }
}
