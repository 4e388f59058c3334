mod bootstrap;
mod health;
mod routes;

use std::sync::Arc;

use anyhow::{Context, Result};
use munchy_core::config::{AppConfig, LoadOptions};
use munchy_db::SqlConversationRepository;

fn init_logging(config: &AppConfig) {
    use munchy_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations.
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config).await?;

    // Startup is fatal if the model backend cannot serve the fallback path.
    app.llm
        .ensure_available()
        .await
        .context("generator backend is unavailable; is the model server running?")?;
    tracing::info!(
        event_name = "system.server.generator_ready",
        correlation_id = "bootstrap",
        model = %app.config.llm.model,
        "generator backend is reachable"
    );

    let state = routes::AppState {
        resolver: app.resolver.clone(),
        conversations: Arc::new(SqlConversationRepository::new(app.db_pool.clone())),
    };
    let router = routes::router(state).merge(health::router(app.db_pool.clone(), app.llm.clone()));

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("could not bind {address}"))?;

    tracing::info!(
        event_name = "system.server.started",
        correlation_id = "bootstrap",
        bind_address = %address,
        "munchy-server started"
    );

    axum::serve(listener, router).with_graceful_shutdown(wait_for_shutdown()).await?;

    tracing::info!(
        event_name = "system.server.stopping",
        correlation_id = "shutdown",
        "munchy-server stopping"
    );

    Ok(())
}

async fn wait_for_shutdown() {
    let _ = tokio::signal::ctrl_c().await;
}
