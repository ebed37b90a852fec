//! # ocflv-api: Binary Entry Point
//!
//! Starts the Axum HTTP server for the verification API.
//! Binds to configurable port (default 8080).

use ocflv_api::state::{AppConfig, AppState};
use ocflv_store::StoreConfig;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize structured tracing.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = AppConfig::from_env().map_err(|e| {
        tracing::error!("invalid service configuration: {e}");
        e
    })?;

    let store_config = StoreConfig::from_env().map_err(|e| {
        tracing::error!("object store not configured: {e}");
        e
    })?;
    tracing::info!(
        endpoint = %store_config.endpoint,
        bucket = %store_config.bucket,
        etag_cache = config.etag_cache,
        "object store configured"
    );

    let store = ocflv_store::connect(&store_config, config.etag_cache)?;
    let port = config.port;
    let state = AppState::new(store, config)?;
    let app = ocflv_api::app(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], port));
    tracing::info!("ocflv API listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
