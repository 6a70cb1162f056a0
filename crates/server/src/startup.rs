use std::{net::SocketAddr, sync::Arc};

use axum::Router;
use configs::{AppConfig, ServerConfig};
use dotenvy::dotenv;
use migration::MigratorTrait;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use crate::errors::StartupError;
use crate::routes::{self, ServerState};
use service::{
    contact::repo::seaorm::SeaOrmContactRepository,
    runtime,
    storage::LocalFileStore,
};

pub fn build_cors() -> CorsLayer {
    CorsLayer::very_permissive()
}

pub fn bind_addr(server: &ServerConfig) -> Result<SocketAddr, StartupError> {
    format!("{}:{}", server.host, server.port)
        .parse()
        .map_err(|e| StartupError::InvalidConfig(format!("bind address {}:{}: {}", server.host, server.port, e)))
}

/// Resolves on Ctrl+C so in-flight requests can finish.
async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "cannot listen for Ctrl+C; shutting down");
    }
    info!("shutdown signal received");
}

/// Public entry: load config from `CONFIG_PATH` or the environment and serve.
pub async fn run() -> anyhow::Result<()> {
    dotenv().ok();
    let cfg = AppConfig::load_or_env()?;
    run_with_config(cfg).await
}

/// Wire the database, file store and router, then serve until Ctrl+C.
pub async fn run_with_config(cfg: AppConfig) -> anyhow::Result<()> {
    runtime::ensure_env(&cfg.storage.public_dir, &cfg.storage.upload_dir)
        .await
        .map_err(|e| StartupError::Runtime(e.to_string()))?;

    // the connection is owned here and dropped when the server stops
    let db = models::db::connect_with_config(&cfg.database).await?;
    if cfg.database.run_migrations {
        migration::Migrator::up(&db, None).await?;
        info!("migrations applied");
    }

    let files = LocalFileStore::new(&cfg.storage.upload_dir).await?;
    let repo = Arc::new(SeaOrmContactRepository::new(db));
    let state = ServerState::new(repo, files);

    let app: Router = routes::build_router(state, build_cors(), &cfg.storage);

    let addr = bind_addr(&cfg.server)?;
    info!(%addr, upload_dir = %cfg.storage.upload_dir, "starting contacts server");
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    info!("server stopped");
    Ok(())
}
