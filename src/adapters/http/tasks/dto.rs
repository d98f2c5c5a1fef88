//! Data transfer objects for task endpoints.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::adapters::http::chat::ChatResponse;
use crate::domain::task::{TaskRecord, TaskStatus};

/// Status of a background chat task.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub task_id: String,
    pub session_id: String,
    pub status: TaskStatus,
    pub result: Option<ChatResponse>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl From<TaskRecord> for TaskResponse {
    fn from(task: TaskRecord) -> Self {
        Self {
            task_id: task.task_id,
            session_id: task.session_id,
            status: task.status,
            result: task.result.map(ChatResponse::from),
            error: task.error,
            created_at: task.created_at,
            completed_at: task.completed_at,
        }
    }
}
