//! API access configuration

use secrecy::{ExposeSecret, Secret};
use serde::Deserialize;

/// API access configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SecurityConfig {
    /// Shared key required in the `X-API-Key` header when set
    pub api_key: Option<Secret<String>>,

    /// User ids allowed to chat (comma-separated); unset allows everyone
    pub allowed_users: Option<String>,
}

impl SecurityConfig {
    /// The API key, if one is configured and non-empty
    pub fn api_key(&self) -> Option<&str> {
        self.api_key
            .as_ref()
            .map(|k| k.expose_secret().as_str())
            .filter(|k| !k.is_empty())
    }

    /// Allowed user ids, `None` when unrestricted
    pub fn allowed_users_list(&self) -> Option<Vec<String>> {
        let users: Vec<String> = self
            .allowed_users
            .as_deref()?
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
        (!users.is_empty()).then_some(users)
    }
}
