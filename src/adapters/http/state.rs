//! Shared state handed to every HTTP handler.

use std::collections::HashSet;
use std::sync::Arc;

use secrecy::Secret;

use crate::application::{
    ChatSettings, ClearSessionHandler, GetHistoryHandler, SendMessageHandler, SessionManager,
    StreamMessageHandler, TaskManager, TaskManagerConfig,
};
use crate::config::ResponseMode;
use crate::domain::debounce::MessageBuffer;
use crate::ports::AgentClient;

/// Application state for the gateway router.
///
/// Cloned per request; every field is a cheap handle.
#[derive(Clone)]
pub struct AppState {
    pub send_message: Arc<SendMessageHandler>,
    pub stream_message: Arc<StreamMessageHandler>,
    pub get_history: Arc<GetHistoryHandler>,
    pub clear_session: Arc<ClearSessionHandler>,
    pub tasks: TaskManager,
    pub buffer: MessageBuffer,
    pub agent: Arc<dyn AgentClient>,
    pub default_response_mode: ResponseMode,
    pub debounce_by_default: bool,
    pub api_key: Option<Arc<Secret<String>>>,
    pub allowed_users: Option<Arc<HashSet<String>>>,
}

impl AppState {
    /// Wires the chat handlers and task manager around one session manager
    /// and agent.
    pub fn new(
        sessions: Arc<SessionManager>,
        agent: Arc<dyn AgentClient>,
        buffer: MessageBuffer,
        settings: ChatSettings,
        task_config: TaskManagerConfig,
    ) -> Self {
        let send_message = Arc::new(SendMessageHandler::new(
            sessions.clone(),
            agent.clone(),
            settings.clone(),
        ));
        let stream_message = Arc::new(StreamMessageHandler::new(
            sessions.clone(),
            agent.clone(),
            settings,
        ));

        Self {
            tasks: TaskManager::new(send_message.clone(), task_config),
            send_message,
            stream_message,
            get_history: Arc::new(GetHistoryHandler::new(sessions.clone())),
            clear_session: Arc::new(ClearSessionHandler::new(sessions, buffer.clone())),
            buffer,
            agent,
            default_response_mode: ResponseMode::default(),
            debounce_by_default: false,
            api_key: None,
            allowed_users: None,
        }
    }

    pub fn with_default_response_mode(mut self, mode: ResponseMode) -> Self {
        self.default_response_mode = mode;
        self
    }

    /// Buffers async requests that do not say otherwise.
    pub fn with_debounce_by_default(mut self, enabled: bool) -> Self {
        self.debounce_by_default = enabled;
        self
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(Arc::new(Secret::new(key.into())));
        self
    }

    pub fn with_allowed_users<I, S>(mut self, users: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_users = Some(Arc::new(users.into_iter().map(Into::into).collect()));
        self
    }

    /// Whether `user_id` may chat. Everyone may when no allow-list is set.
    pub fn is_user_allowed(&self, user_id: &str) -> bool {
        self.allowed_users
            .as_ref()
            .map_or(true, |users| users.contains(user_id))
    }
}
