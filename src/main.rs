//! agent-gateway server binary.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;

use agent_gateway::adapters::agent::CliAgentClient;
use agent_gateway::adapters::http::{create_router, AppState};
use agent_gateway::adapters::session_store::{
    FileSessionStore, InMemorySessionStore, RedisSessionStore,
};
use agent_gateway::application::SessionManager;
use agent_gateway::config::{AppConfig, SessionBackend};
use agent_gateway::domain::debounce::MessageBuffer;
use agent_gateway::ports::{AgentClient, SessionStore, SessionStoreError};
use agent_gateway::telemetry;

/// HTTP gateway for a conversational agent CLI
#[derive(Parser)]
#[command(name = "agent-gateway")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Configuration file (YAML, TOML or JSON)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Overrides `server.host`
    #[arg(long)]
    host: Option<String>,

    /// Overrides `server.port`
    #[arg(short, long)]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let mut config = AppConfig::load(cli.config.as_deref())?;
    if let Some(host) = cli.host {
        config.server.host = host;
    }
    if let Some(port) = cli.port {
        config.server.port = port;
    }
    config.validate()?;

    let _telemetry = telemetry::init(&config.server)?;
    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        environment = ?config.server.environment,
        "Starting agent gateway"
    );

    let store = build_session_store(&config).await?;
    let sessions = Arc::new(SessionManager::new(store));
    let agent: Arc<dyn AgentClient> = Arc::new(CliAgentClient::new(config.agent.cli_config()));
    let buffer = MessageBuffer::new(config.debounce.buffer_config());

    let mut state = AppState::new(
        sessions,
        agent,
        buffer,
        config.agent.chat_settings()?,
        config.tasks.task_manager_config(),
    )
    .with_default_response_mode(config.server.default_response_mode)
    .with_debounce_by_default(config.debounce.enabled);
    if let Some(key) = config.security.api_key() {
        state = state.with_api_key(key);
    }
    if let Some(users) = config.security.allowed_users_list() {
        tracing::info!(count = users.len(), "User allow-list enabled");
        state = state.with_allowed_users(users);
    }

    let _task_sweeper = state
        .tasks
        .spawn_sweeper(config.tasks.cleanup_interval(), config.tasks.retention());

    let app = create_router(state, &config.server.cors_origins_list());
    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

/// Opens the configured store. Memory and file stores get a background
/// purge of idle sessions when a TTL is set; Redis expires keys itself.
async fn build_session_store(
    config: &AppConfig,
) -> Result<Arc<dyn SessionStore>, SessionStoreError> {
    let session = &config.session;
    let sweep_every = config.tasks.cleanup_interval();

    match session.store {
        SessionBackend::Memory => {
            let store = InMemorySessionStore::new();
            if let Some(ttl) = session.ttl() {
                let sweeper = store.clone();
                tokio::spawn(async move {
                    every(sweep_every, || async {
                        let removed = sweeper.purge_expired(ttl).await;
                        if removed > 0 {
                            tracing::info!(removed, "Purged idle sessions");
                        }
                    })
                    .await
                });
            }
            tracing::info!(backend = "memory", "Session store ready");
            Ok(Arc::new(store))
        }
        SessionBackend::File => {
            let store = Arc::new(FileSessionStore::new(&session.storage_dir).await?);
            if let Some(ttl) = session.ttl() {
                let sweeper = store.clone();
                tokio::spawn(async move {
                    every(sweep_every, || async {
                        match sweeper.purge_expired(ttl).await {
                            Ok(0) => {}
                            Ok(removed) => tracing::info!(removed, "Purged idle sessions"),
                            Err(e) => tracing::warn!(error = %e, "Session purge failed"),
                        }
                    })
                    .await
                });
            }
            tracing::info!(
                backend = "file",
                dir = %store.storage_dir().display(),
                "Session store ready"
            );
            Ok(store as Arc<dyn SessionStore>)
        }
        SessionBackend::Redis => {
            let store = RedisSessionStore::connect(&session.redis_url)
                .await?
                .with_prefix(session.redis_prefix.clone())
                .with_ttl(session.ttl());
            tracing::info!(backend = "redis", "Session store ready");
            Ok(Arc::new(store))
        }
    }
}

async fn every<F, Fut>(period: Duration, mut tick: F)
where
    F: FnMut() -> Fut,
    Fut: std::future::Future<Output = ()>,
{
    let mut interval = tokio::time::interval(period);
    interval.tick().await;
    loop {
        interval.tick().await;
        tick().await;
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
