//! RealFlow HTTP Server Binary
//!
//! This is the main entry point for the RealFlow REST API server.
//! It initializes the repository, sets up the HTTP router, and serves requests
//! until Ctrl-C or SIGTERM.
//!
//! # Usage
//!
//! ```bash
//! # Run against SQL Server
//! DB_SERVER=10.0.0.5 DB_DATABASE=Metering DB_USER=reader DB_PASSWORD=secret \
//!   cargo run --bin realflow-server
//!
//! # Run with the in-memory repository seeded from a JSON file
//! REPOSITORY_TYPE=local LOCAL_SEED_FILE=backend/data/sample_feed.json \
//!   cargo run --bin realflow-server
//!
//! # Run from a TOML configuration file
//! REPOSITORY_CONFIG=backend/repository.toml cargo run --bin realflow-server
//! ```
//!
//! # Environment Variables
//!
//! - `HOST`: Server host (default: 0.0.0.0)
//! - `PORT`: Server port (default: 3000)
//! - `RUST_LOG`: Log level (default: info)
//! - `REPOSITORY_CONFIG`: TOML file selecting the backend (overrides the variables below)
//! - `REPOSITORY_TYPE`, `DB_*`, `REALFLOW_COMID`, `LOCAL_SEED_FILE`: see `db::config`
//! - `RECONCILE_UNMATCHED`: `drop` (default) or `incomplete`

use std::env;
use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use tracing::{info, warn, Level};
use tracing_subscriber::FmtSubscriber;

use realflow_api::db::{self, RealflowRepository, RepositoryConfig, RepositoryFactory};
use realflow_api::http::{create_router, AppState};
use realflow_api::services::UnmatchedPolicy;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    FmtSubscriber::builder()
        .with_max_level(
            env::var("RUST_LOG")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(Level::INFO),
        )
        .with_target(true)
        .with_thread_ids(true)
        .init();

    info!("Starting RealFlow HTTP Server");

    let (repository, policy) = load_repository().await?;
    info!(
        "Repository initialized ({} backend, unmatched openers: {})",
        repository.backend_name(),
        policy.as_str()
    );

    match repository.health_check().await {
        Ok(true) => info!("Database reachable"),
        Ok(false) => warn!("Database reported unhealthy"),
        Err(e) => warn!("Database not reachable yet: {}", e),
    }

    let state = AppState::new(repository).with_unmatched_policy(policy);
    let app = create_router(state);

    // Determine bind address
    let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = env::var("PORT")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(3000);
    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

    info!("Server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

async fn load_repository() -> anyhow::Result<(Arc<dyn RealflowRepository>, UnmatchedPolicy)> {
    match env::var("REPOSITORY_CONFIG") {
        Ok(path) if !path.trim().is_empty() => {
            info!("Loading repository configuration from {}", path);
            let config = RepositoryConfig::from_file(&path)?;
            let repository = RepositoryFactory::from_repository_config(&config).await?;
            Ok((repository, config.reconciler.unmatched))
        }
        _ => {
            let policy = db::unmatched_policy_from_env().map_err(anyhow::Error::msg)?;
            let repository = RepositoryFactory::from_env().await?;
            Ok((repository, policy))
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl-C handler: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("Received Ctrl-C, shutting down"),
        _ = terminate => info!("Received SIGTERM, shutting down"),
    }
}
