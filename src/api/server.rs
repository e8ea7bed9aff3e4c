use tokio::net::TcpListener;
use tracing::{info, warn};

use super::handler::{RelayState, router};
use crate::ai::build_provider;
use crate::core::config::AppConfig;
use crate::errors::RecapError;
use crate::utils::http_client;

/// Binds the configured address and serves the relay until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be built, the address cannot
/// be bound, or the server fails.
pub async fn run(config: AppConfig) -> Result<(), RecapError> {
    let provider = build_provider(&config, http_client()?);
    info!(
        provider = config.provider.as_str(),
        bind_addr = %config.bind_addr,
        "Starting completion relay"
    );

    let listener = TcpListener::bind(&config.bind_addr).await.map_err(|e| {
        RecapError::ConfigError(format!("failed to bind {}: {e}", config.bind_addr))
    })?;

    axum::serve(listener, router(RelayState::new(provider)))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| RecapError::HttpError(format!("relay server error: {e}")))
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}
