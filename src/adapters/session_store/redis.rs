//! Redis-backed session store for multi-server deployments.
//!
//! Each session is a JSON string under `prefix + session_id`. With a TTL
//! configured, every save refreshes the expiry, so idle sessions age out on
//! the Redis side.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;
use std::time::Duration;

use crate::domain::session::SessionData;
use crate::ports::{SessionStore, SessionStoreError};

/// Default key prefix for session entries.
pub const DEFAULT_REDIS_PREFIX: &str = "agent_session:";

/// Redis-backed session storage
#[derive(Clone)]
pub struct RedisSessionStore {
    conn: MultiplexedConnection,
    prefix: String,
    ttl: Option<Duration>,
}

impl RedisSessionStore {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            prefix: DEFAULT_REDIS_PREFIX.to_string(),
            ttl: None,
        }
    }

    /// Opens a multiplexed connection to `url`.
    pub async fn connect(url: &str) -> Result<Self, SessionStoreError> {
        let client = redis::Client::open(url).map_err(backend)?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(backend)?;
        Ok(Self::new(conn))
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    /// Expire sessions after `ttl` without a save. `None` keeps them forever.
    pub fn with_ttl(mut self, ttl: Option<Duration>) -> Self {
        self.ttl = ttl.filter(|t| !t.is_zero());
        self
    }

    fn key(&self, session_id: &str) -> String {
        format!("{}{}", self.prefix, session_id)
    }
}

fn backend(err: redis::RedisError) -> SessionStoreError {
    SessionStoreError::Backend(err.to_string())
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get(&self, session_id: &str) -> Result<Option<SessionData>, SessionStoreError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn.get(self.key(session_id)).await.map_err(backend)?;
        value
            .map(|json| serde_json::from_str(&json).map_err(SessionStoreError::from))
            .transpose()
    }

    async fn save(&self, session: &SessionData) -> Result<(), SessionStoreError> {
        let mut stored = session.clone();
        stored.touch();
        let json = serde_json::to_string(&stored)?;
        let mut conn = self.conn.clone();

        let mut cmd = redis::cmd("SET");
        cmd.arg(self.key(&stored.session_id)).arg(json);
        if let Some(ttl) = self.ttl {
            cmd.arg("EX").arg(ttl.as_secs().max(1));
        }
        cmd.query_async::<_, ()>(&mut conn).await.map_err(backend)
    }

    async fn delete(&self, session_id: &str) -> Result<(), SessionStoreError> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(self.key(session_id))
            .await
            .map_err(backend)
    }

    async fn exists(&self, session_id: &str) -> Result<bool, SessionStoreError> {
        let mut conn = self.conn.clone();
        conn.exists(self.key(session_id)).await.map_err(backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Requires a running Redis instance.
    #[tokio::test]
    #[ignore] // Run with: cargo test -- --ignored
    async fn round_trips_session_through_redis() {
        let store = RedisSessionStore::connect("redis://127.0.0.1/")
            .await
            .unwrap()
            .with_prefix("agent_session_test:")
            .with_ttl(Some(Duration::from_secs(60)));

        let session = SessionData::new("user_redis_test", Some("redis_test".to_string()));
        store.save(&session).await.unwrap();

        assert!(store.exists("user_redis_test").await.unwrap());
        let loaded = store.get("user_redis_test").await.unwrap().unwrap();
        assert_eq!(loaded.session_id, "user_redis_test");

        store.delete("user_redis_test").await.unwrap();
        assert!(!store.exists("user_redis_test").await.unwrap());
    }
}
