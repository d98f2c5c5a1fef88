//! TaskManager - background execution of chat turns.
//!
//! Submitted commands get a task id immediately and run on the tokio
//! runtime, bounded by a semaphore and a per-task timeout. Finished tasks
//! stay queryable until a sweep removes them.

use std::collections::HashMap;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};

use futures::FutureExt;
use tokio::sync::{RwLock, Semaphore};
use tokio::task::JoinHandle;
use uuid::Uuid;

use super::handlers::chat::{ChatCommand, SendMessageHandler};
use crate::domain::debounce::{flush_fn, FlushHandler};
use crate::domain::foundation::ValidationError;
use crate::domain::task::TaskRecord;

/// Limits applied to background tasks.
#[derive(Debug, Clone)]
pub struct TaskManagerConfig {
    pub max_concurrent: usize,
    pub task_timeout: Duration,
}

impl Default for TaskManagerConfig {
    fn default() -> Self {
        Self {
            max_concurrent: 10,
            task_timeout: Duration::from_secs(600),
        }
    }
}

/// Registry and executor for async chat tasks.
#[derive(Clone)]
pub struct TaskManager {
    tasks: Arc<RwLock<HashMap<String, TaskRecord>>>,
    permits: Arc<Semaphore>,
    task_timeout: Duration,
    handler: Arc<SendMessageHandler>,
}

impl TaskManager {
    pub fn new(handler: Arc<SendMessageHandler>, config: TaskManagerConfig) -> Self {
        Self {
            tasks: Arc::new(RwLock::new(HashMap::new())),
            permits: Arc::new(Semaphore::new(config.max_concurrent.max(1))),
            task_timeout: config.task_timeout,
            handler,
        }
    }

    /// Records a pending task and starts it in the background.
    pub async fn submit(&self, cmd: ChatCommand) -> String {
        let task_id = Uuid::new_v4().to_string();
        let session_key = cmd.session_key();

        self.tasks.write().await.insert(
            task_id.clone(),
            TaskRecord::pending(task_id.clone(), session_key.clone()),
        );

        tracing::info!(
            task_id = %task_id,
            session_key = %session_key,
            user_id = %cmd.user_id,
            message_chars = cmd.message.chars().count(),
            message_parts = cmd.message.lines().count(),
            "Submitted chat task"
        );

        tokio::spawn(self.clone().run(task_id.clone(), cmd));
        task_id
    }

    async fn run(self, task_id: String, cmd: ChatCommand) {
        let _permit = match self.permits.clone().acquire_owned().await {
            Ok(permit) => permit,
            Err(_) => {
                self.update(&task_id, |t| t.fail("Task executor is shut down"))
                    .await;
                return;
            }
        };

        self.update(&task_id, TaskRecord::start).await;
        let started = Instant::now();

        let work = AssertUnwindSafe(self.handler.handle(cmd)).catch_unwind();
        match tokio::time::timeout(self.task_timeout, work).await {
            Ok(Ok(Ok(reply))) => {
                tracing::info!(
                    task_id = %task_id,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Chat task completed"
                );
                self.update(&task_id, |t| t.complete(reply)).await;
            }
            Ok(Ok(Err(e))) => {
                tracing::error!(task_id = %task_id, error = %e, "Chat task failed");
                self.update(&task_id, |t| t.fail(e.to_string())).await;
            }
            Ok(Err(_panic)) => {
                tracing::error!(task_id = %task_id, "Chat task panicked");
                self.update(&task_id, |t| t.fail("Task panicked")).await;
            }
            Err(_) => {
                let secs = self.task_timeout.as_secs();
                tracing::error!(task_id = %task_id, timeout_secs = secs, "Chat task timed out");
                self.update(&task_id, |t| t.fail(format!("Task timed out after {}s", secs)))
                    .await;
            }
        }
    }

    async fn update<F>(&self, task_id: &str, apply: F)
    where
        F: FnOnce(&mut TaskRecord) -> Result<(), ValidationError>,
    {
        let mut tasks = self.tasks.write().await;
        // The task may have been swept already.
        if let Some(task) = tasks.get_mut(task_id) {
            if let Err(e) = apply(task) {
                tracing::warn!(task_id, error = %e, "Ignoring invalid task transition");
            }
        }
    }

    pub async fn get(&self, task_id: &str) -> Option<TaskRecord> {
        self.tasks.read().await.get(task_id).cloned()
    }

    /// Most recently created task for a session.
    pub async fn latest_for_session(&self, session_key: &str) -> Option<TaskRecord> {
        self.tasks
            .read()
            .await
            .values()
            .filter(|t| t.session_id == session_key)
            .max_by_key(|t| t.created_at)
            .cloned()
    }

    /// Removes tasks that finished more than `max_age` ago.
    pub async fn cleanup_older_than(&self, max_age: Duration) -> usize {
        let Some(cutoff) = chrono::Duration::from_std(max_age)
            .ok()
            .and_then(|age| chrono::Utc::now().checked_sub_signed(age))
        else {
            return 0;
        };

        let mut tasks = self.tasks.write().await;
        let before = tasks.len();
        tasks.retain(|_, task| match task.completed_at {
            Some(done) => done > cutoff,
            None => true,
        });
        let removed = before - tasks.len();
        if removed > 0 {
            tracing::debug!(removed, "Swept finished tasks");
        }
        removed
    }

    /// Periodically removes finished tasks older than `retention`.
    pub fn spawn_sweeper(&self, interval: Duration, retention: Duration) -> JoinHandle<()> {
        let manager = self.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                ticker.tick().await;
                manager.cleanup_older_than(retention).await;
            }
        })
    }

    /// Flush handler that submits the combined messages as one task.
    ///
    /// `template` supplies the user, session and metadata; its message is
    /// replaced by the flushed text.
    pub fn flush_handler(&self, template: ChatCommand) -> Arc<dyn FlushHandler> {
        let manager = self.clone();
        flush_fn(move |session_key, combined| {
            let manager = manager.clone();
            let cmd = ChatCommand {
                message: combined,
                ..template.clone()
            };
            async move {
                let task_id = manager.submit(cmd).await;
                tracing::info!(session_key = %session_key, task_id = %task_id, "Flushed buffered messages into task");
                Ok(())
            }
        })
    }
}
