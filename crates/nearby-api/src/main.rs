//! Nearby API Server
//!
//! Authentication session server for the Nearby marketplace.
//!
//! Author: hephaex@gmail.com

use anyhow::Context;
use nearby_api::{create_router, state::AppState};
use nearby_core::{AppConfig, LoggingConfig};
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration (file first when NEARBY_CONFIG is set, env always wins)
    let config = match std::env::var("NEARBY_CONFIG") {
        Ok(path) => AppConfig::from_file(&path)?.with_env_override()?,
        Err(_) => AppConfig::from_env()?,
    };

    init_tracing(&config.logging);
    config.validate().context("Invalid configuration")?;

    let addr = format!("{}:{}", config.server.host, config.server.port);
    tracing::info!(
        backend = ?config.database.backend,
        access_token_ttl_secs = config.auth.access_token_ttl_secs,
        "Configuration loaded"
    );

    // Create application state
    let state = Arc::new(AppState::connect(config).await?);

    // Create router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {addr}"))?;
    tracing::info!("Nearby API Server starting on http://{}", addr);
    tracing::info!("OpenAPI spec at http://{}/api-docs/openapi.json", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        format!(
            "nearby_api={level},nearby_core={level},audit=info,tower_http=debug",
            level = logging.level
        )
        .into()
    });

    if logging.json_format {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        return;
    }
    tracing::info!("Shutdown signal received");
}
