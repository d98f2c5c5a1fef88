//! Background chat tasks submitted through the async response mode.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::foundation::{StateMachine, ValidationError};
use super::session::ChatReply;

/// Lifecycle of a background task.
///
/// `Pending -> Processing -> Completed | Failed`. A pending task may also
/// fail directly when it never gets to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum TaskStatus {
    #[default]
    Pending,
    Processing,
    Completed,
    Failed,
}

impl StateMachine for TaskStatus {
    fn valid_transitions(&self) -> Vec<Self> {
        use TaskStatus::*;
        match self {
            Pending => vec![Processing, Failed],
            Processing => vec![Completed, Failed],
            Completed | Failed => vec![],
        }
    }
}

/// Snapshot of a submitted task.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TaskRecord {
    pub task_id: String,
    pub session_id: String,
    pub status: TaskStatus,
    pub result: Option<ChatReply>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub completed_at: Option<DateTime<Utc>>,
}

impl TaskRecord {
    pub fn pending(task_id: impl Into<String>, session_id: impl Into<String>) -> Self {
        Self {
            task_id: task_id.into(),
            session_id: session_id.into(),
            status: TaskStatus::Pending,
            result: None,
            error: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    pub fn start(&mut self) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(TaskStatus::Processing)?;
        Ok(())
    }

    pub fn complete(&mut self, reply: ChatReply) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(TaskStatus::Completed)?;
        self.result = Some(reply);
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn fail(&mut self, error: impl Into<String>) -> Result<(), ValidationError> {
        self.status = self.status.transition_to(TaskStatus::Failed)?;
        self.error = Some(error.into());
        self.completed_at = Some(Utc::now());
        Ok(())
    }

    pub fn is_finished(&self) -> bool {
        self.status.is_terminal()
    }
}
