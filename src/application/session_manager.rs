//! SessionManager - session lifecycle on top of a SessionStore.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;

use crate::domain::session::{ConversationMessage, SessionData, SessionError};
use crate::ports::SessionStore;

/// Creates, loads and updates sessions through the configured store.
#[derive(Clone)]
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
}

impl SessionManager {
    pub fn new(store: Arc<dyn SessionStore>) -> Self {
        Self { store }
    }

    /// Creates and persists a fresh session, replacing any existing one.
    pub async fn create(
        &self,
        session_id: &str,
        user_id: Option<String>,
        metadata: HashMap<String, Value>,
    ) -> Result<SessionData, SessionError> {
        let session = SessionData::new(session_id, user_id).with_metadata(metadata);
        self.store.save(&session).await?;
        tracing::debug!(session_key = session_id, "Created session");
        Ok(session)
    }

    pub async fn find(&self, session_id: &str) -> Result<Option<SessionData>, SessionError> {
        Ok(self.store.get(session_id).await?)
    }

    /// Loads a session, failing with `NotFound` if it does not exist.
    pub async fn get(&self, session_id: &str) -> Result<SessionData, SessionError> {
        self.find(session_id)
            .await?
            .ok_or_else(|| SessionError::not_found(session_id))
    }

    pub async fn get_or_create(
        &self,
        session_id: &str,
        user_id: Option<String>,
    ) -> Result<SessionData, SessionError> {
        match self.find(session_id).await? {
            Some(session) => Ok(session),
            None => self.create(session_id, user_id, HashMap::new()).await,
        }
    }

    pub async fn save(&self, session: &SessionData) -> Result<(), SessionError> {
        Ok(self.store.save(session).await?)
    }

    pub async fn add_message(
        &self,
        session_id: &str,
        message: ConversationMessage,
    ) -> Result<(), SessionError> {
        let mut session = self.get(session_id).await?;
        session.push_message(message);
        self.save(&session).await
    }

    pub async fn update_agent_session_id(
        &self,
        session_id: &str,
        agent_session_id: impl Into<String>,
    ) -> Result<(), SessionError> {
        let mut session = self.get(session_id).await?;
        session.agent_session_id = Some(agent_session_id.into());
        self.save(&session).await
    }

    /// Deletes a session; returns whether it existed.
    pub async fn delete(&self, session_id: &str) -> Result<bool, SessionError> {
        let existed = self.store.exists(session_id).await?;
        if existed {
            self.store.delete(session_id).await?;
            tracing::info!(session_key = session_id, "Deleted session");
        }
        Ok(existed)
    }

    pub async fn history(&self, session_id: &str) -> Result<Vec<ConversationMessage>, SessionError> {
        Ok(self.get(session_id).await?.conversation_history)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::session_store::InMemorySessionStore;
    use crate::domain::session::MessageRole;
    use crate::ports::SessionStoreError;
    use async_trait::async_trait;

    fn manager() -> SessionManager {
        SessionManager::new(Arc::new(InMemorySessionStore::new()))
    }

    struct FailingStore;

    #[async_trait]
    impl SessionStore for FailingStore {
        async fn get(&self, _: &str) -> Result<Option<SessionData>, SessionStoreError> {
            Err(SessionStoreError::backend("down"))
        }
        async fn save(&self, _: &SessionData) -> Result<(), SessionStoreError> {
            Err(SessionStoreError::backend("down"))
        }
        async fn delete(&self, _: &str) -> Result<(), SessionStoreError> {
            Err(SessionStoreError::backend("down"))
        }
        async fn exists(&self, _: &str) -> Result<bool, SessionStoreError> {
            Err(SessionStoreError::backend("down"))
        }
    }

    #[tokio::test]
    async fn get_missing_session_is_not_found() {
        let err = manager().get("user_nobody").await.unwrap_err();
        assert_eq!(err, SessionError::not_found("user_nobody"));
    }

    #[tokio::test]
    async fn get_or_create_reuses_existing_session() {
        let manager = manager();
        let first = manager
            .get_or_create("user_1", Some("1".to_string()))
            .await
            .unwrap();
        manager
            .add_message("user_1", ConversationMessage::user("hi"))
            .await
            .unwrap();

        let second = manager.get_or_create("user_1", None).await.unwrap();

        assert_eq!(second.created_at, first.created_at);
        assert_eq!(second.user_id.as_deref(), Some("1"));
        assert_eq!(second.conversation_history.len(), 1);
    }

    #[tokio::test]
    async fn history_keeps_message_order() {
        let manager = manager();
        manager.create("s", None, HashMap::new()).await.unwrap();
        manager
            .add_message("s", ConversationMessage::user("question"))
            .await
            .unwrap();
        manager
            .add_message("s", ConversationMessage::assistant("answer"))
            .await
            .unwrap();

        let history = manager.history("s").await.unwrap();
        let roles: Vec<_> = history.iter().map(|m| m.role).collect();
        assert_eq!(roles, vec![MessageRole::User, MessageRole::Assistant]);
    }

    #[tokio::test]
    async fn update_agent_session_id_persists() {
        let manager = manager();
        manager.create("s", None, HashMap::new()).await.unwrap();
        manager.update_agent_session_id("s", "abc").await.unwrap();
        assert_eq!(
            manager.get("s").await.unwrap().agent_session_id.as_deref(),
            Some("abc")
        );
    }

    #[tokio::test]
    async fn delete_reports_existence() {
        let manager = manager();
        manager.create("s", None, HashMap::new()).await.unwrap();
        assert!(manager.delete("s").await.unwrap());
        assert!(!manager.delete("s").await.unwrap());
    }

    #[tokio::test]
    async fn store_failures_surface_as_storage_errors() {
        let manager = SessionManager::new(Arc::new(FailingStore));
        let err = manager.get_or_create("s", None).await.unwrap_err();
        assert!(matches!(err, SessionError::Storage(_)));
    }
}
