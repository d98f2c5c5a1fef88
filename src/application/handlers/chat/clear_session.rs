//! ClearSessionHandler - forget a session and any buffered messages.

use std::sync::Arc;

use crate::application::SessionManager;
use crate::domain::debounce::MessageBuffer;
use crate::domain::session::SessionError;

pub struct ClearSessionHandler {
    sessions: Arc<SessionManager>,
    buffer: MessageBuffer,
}

impl ClearSessionHandler {
    pub fn new(sessions: Arc<SessionManager>, buffer: MessageBuffer) -> Self {
        Self { sessions, buffer }
    }

    /// Drops buffered messages first so a pending flush cannot recreate the
    /// session. Returns whether a stored session existed.
    pub async fn handle(&self, session_id: &str) -> Result<bool, SessionError> {
        self.buffer.cleanup_session(session_id).await;
        self.sessions.delete(session_id).await
    }
}
