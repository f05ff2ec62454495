//! playercount-gateway server entry point.
//!
//! Resolves configuration, connects the store, and serves the REST API.

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use playercount_gateway::api;
use playercount_gateway::api::auth::AuthPolicy;
use playercount_gateway::app_state::AppState;
use playercount_gateway::config::{GatewayConfig, LogFormat};
use playercount_gateway::domain::SystemClock;
use playercount_gateway::persistence::StoreBackend;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = GatewayConfig::from_env()?;

    // Initialize tracing
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    match config.log_format {
        LogFormat::Json => tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init(),
        LogFormat::Text => tracing_subscriber::fmt().with_env_filter(filter).init(),
    }
    tracing::info!(addr = %config.listen_addr, store = ?config.store_kind, "starting playercount-gateway");
    if config.api_key.is_none() {
        tracing::warn!("API_KEY not set; ingest endpoint is open");
    }

    // Build persistence layer
    let store = Arc::new(StoreBackend::from_config(&config).await?);

    // Build application state
    let app_state = AppState::new(
        store,
        Arc::new(SystemClock),
        config.store_timeout,
        AuthPolicy::new(config.api_key.clone(), config.protect_reads),
    );

    // Build router
    let app = api::build_app(app_state, config.request_timeout);

    // Start server
    let listener = tokio::net::TcpListener::bind(config.listen_addr).await?;
    tracing::info!(addr = %config.listen_addr, "server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
    tracing::info!("shutdown signal received");
}
