use std::net::SocketAddr;

use axum::Router;
use configs::AppConfig;
use tracing::info;

use crate::errors::StartupError;
use crate::routes;
use crate::state::ServerState;
use service::{runtime, storage, ReviewService};

fn load_bind_addr(cfg: &AppConfig) -> anyhow::Result<SocketAddr> {
    Ok(format!("{}:{}", cfg.server.host, cfg.server.port).parse()?)
}

/// Build the application router from configuration: storage backend, review
/// service, CORS and tracing layers.
pub async fn build_app(cfg: &AppConfig) -> Result<Router, StartupError> {
    runtime::ensure_env(&cfg.storage).await?;

    let backend = storage::build_backend(&cfg.storage)
        .await
        .map_err(|e| StartupError::Storage(e.to_string()))?;
    let state = ServerState::new(ReviewService::new(backend));

    let cors = routes::build_cors(&cfg.server.cors_origins);
    Ok(routes::build_router(state, cors))
}

/// Build the app for an already validated configuration and serve HTTP
/// until the listener fails.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    let app = build_app(&cfg).await?;

    let addr = load_bind_addr(&cfg)?;
    info!(%addr, backend = ?cfg.storage.backend, "starting review server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
