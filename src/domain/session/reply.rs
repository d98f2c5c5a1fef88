use std::collections::HashMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outcome of one chat turn, as returned to callers and stored on tasks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatReply {
    pub content: String,
    pub session_id: String,
    pub agent_session_id: Option<String>,
    pub success: bool,
    #[serde(default)]
    pub metadata: HashMap<String, Value>,
}
