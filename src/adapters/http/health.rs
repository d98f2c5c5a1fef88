//! Liveness endpoint.

use axum::extract::State;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::state::AppState;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    /// `None` when the agent binary cannot be queried.
    pub agent_version: Option<String>,
}

/// GET /health - Service status and agent CLI version
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    let agent_version = match state.agent.version().await {
        Ok(version) => Some(version),
        Err(e) => {
            tracing::debug!(error = %e, "Agent version probe failed");
            None
        }
    };

    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        agent_version,
    })
}
