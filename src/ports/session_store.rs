//! Session Store Port - Interface for persisting conversation sessions.
//!
//! Sessions are stored whole: a `save` replaces the previous record for the
//! same id. Backends are selected at startup (memory, file, Redis).

use async_trait::async_trait;

use crate::domain::session::SessionData;

/// Errors that can occur during session storage operations
#[derive(Debug, thiserror::Error)]
pub enum SessionStoreError {
    #[error("IO error: {0}")]
    Io(String),

    #[error("Failed to serialize session: {0}")]
    Serialization(String),

    #[error("Session backend error: {0}")]
    Backend(String),
}

impl SessionStoreError {
    pub fn io(message: impl Into<String>) -> Self {
        SessionStoreError::Io(message.into())
    }

    pub fn serialization(message: impl Into<String>) -> Self {
        SessionStoreError::Serialization(message.into())
    }

    pub fn backend(message: impl Into<String>) -> Self {
        SessionStoreError::Backend(message.into())
    }
}

impl From<std::io::Error> for SessionStoreError {
    fn from(err: std::io::Error) -> Self {
        SessionStoreError::Io(err.to_string())
    }
}

impl From<serde_json::Error> for SessionStoreError {
    fn from(err: serde_json::Error) -> Self {
        SessionStoreError::Serialization(err.to_string())
    }
}

/// Port for loading and saving sessions by id.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load a session, `None` if it does not exist.
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, SessionStoreError>;

    /// Insert or replace a session. Implementations stamp `last_activity`.
    async fn save(&self, session: &SessionData) -> Result<(), SessionStoreError>;

    /// Remove a session. Deleting a missing session is not an error.
    async fn delete(&self, session_id: &str) -> Result<(), SessionStoreError>;

    /// Returns true if a session is stored under this id.
    async fn exists(&self, session_id: &str) -> Result<bool, SessionStoreError>;
}
