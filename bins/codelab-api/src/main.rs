mod handlers;
mod metrics;
mod routes;

use anyhow::{Context, Result};
use axum::Router;
use codelab_sandbox::{RuntimeConfig, SuiteRunner};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tracing::{info, warn};

pub struct AppState {
    pub runner: SuiteRunner,
    pub config: RuntimeConfig,
}

impl AppState {
    pub fn new(config: RuntimeConfig) -> Self {
        Self {
            runner: SuiteRunner::from_config(&config),
            config,
        }
    }
}

fn init_tracing() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    if std::env::var("LOG_FORMAT").is_ok_and(|format| format == "json") {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    warn!("Received shutdown signal, finishing in-flight suites...");
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    info!("Codelab API booting...");

    let config_path = std::env::var("CODELAB_CONFIG")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(codelab_sandbox::config::DEFAULT_CONFIG_PATH));
    let config = RuntimeConfig::load_or_default(&config_path)?.with_env_overrides()?;

    info!(
        runtime = %config.name,
        version = %config.version,
        command = %config.command,
        memory_limit_mb = config.memory_limit_mb,
        max_timeout_ms = config.max_timeout_ms,
        "Runtime configured"
    );

    let state = Arc::new(AppState::new(config));

    let app = Router::new().merge(routes::routes()).with_state(state);

    let addr = std::env::var("CODELAB_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {addr}"))?;

    info!("HTTP server listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    info!("API shutdown complete");
    Ok(())
}
