//! File-based Session Store
//!
//! Stores each session as a pretty-printed JSON file named after the
//! session id, so sessions survive restarts and can be inspected by hand.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tokio::fs;

use crate::domain::session::SessionData;
use crate::ports::{SessionStore, SessionStoreError};

/// File-based storage for sessions
#[derive(Debug, Clone)]
pub struct FileSessionStore {
    storage_dir: PathBuf,
}

impl FileSessionStore {
    /// Create a store rooted at `storage_dir`, creating the directory.
    ///
    /// # Example
    /// ```ignore
    /// let store = FileSessionStore::new(".sessions").await?;
    /// ```
    pub async fn new<P: AsRef<Path>>(storage_dir: P) -> Result<Self, SessionStoreError> {
        let storage_dir = storage_dir.as_ref().to_path_buf();
        fs::create_dir_all(&storage_dir).await?;
        Ok(Self { storage_dir })
    }

    pub fn storage_dir(&self) -> &Path {
        &self.storage_dir
    }

    /// Path separators in the id would escape the storage directory.
    fn file_path(&self, session_id: &str) -> PathBuf {
        let safe_id = session_id.replace(['/', '\\'], "_");
        self.storage_dir.join(format!("{}.json", safe_id))
    }

    /// Deletes session files not modified within `max_age`; returns how many.
    pub async fn purge_expired(&self, max_age: Duration) -> Result<usize, SessionStoreError> {
        let now = SystemTime::now();
        let mut removed = 0;
        let mut entries = fs::read_dir(&self.storage_dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let modified = match entry.metadata().await.and_then(|m| m.modified()) {
                Ok(modified) => modified,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "Cannot stat session file");
                    continue;
                }
            };
            let age = now.duration_since(modified).unwrap_or(Duration::ZERO);
            if age > max_age {
                match fs::remove_file(&path).await {
                    Ok(()) => {
                        removed += 1;
                        tracing::debug!(path = %path.display(), "Removed expired session file");
                    }
                    Err(e) => {
                        tracing::warn!(path = %path.display(), error = %e, "Failed to remove session file")
                    }
                }
            }
        }

        Ok(removed)
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, SessionStoreError> {
        let path = self.file_path(session_id);
        let json = match fs::read_to_string(&path).await {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        // A corrupt file is treated as a fresh session rather than an outage.
        match serde_json::from_str(&json) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(session_id, error = %e, "Ignoring unreadable session file");
                Ok(None)
            }
        }
    }

    async fn save(&self, session: &SessionData) -> Result<(), SessionStoreError> {
        let mut stored = session.clone();
        stored.touch();
        let json = serde_json::to_string_pretty(&stored)?;
        fs::write(self.file_path(&stored.session_id), json).await?;
        Ok(())
    }

    async fn delete(&self, session_id: &str) -> Result<(), SessionStoreError> {
        match fs::remove_file(self.file_path(session_id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    async fn exists(&self, session_id: &str) -> Result<bool, SessionStoreError> {
        Ok(fs::try_exists(self.file_path(session_id)).await?)
    }
}
