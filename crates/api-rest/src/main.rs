//! Standalone REST API server binary.
//!
//! ## Purpose
//! Runs the REST API server on its own.
//!
//! ## Intended use
//! Useful for development and debugging when you only want the REST server
//! (with OpenAPI/Swagger UI). The workspace's main `carebook-run` binary is
//! the deployment entry point.

use api_rest::AppState;
use carebook_core::CoreConfig;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Carebook REST API server
///
/// Starts the REST API server on the configured address (default:
/// 0.0.0.0:3000) with OpenAPI/Swagger documentation.
///
/// # Environment Variables
/// - `CAREBOOK_REST_ADDR`: Server address (default: "0.0.0.0:3000")
/// - `CARE_DATA_DIR`: Root of the document store (default: "/care_data")
///
/// # Errors
/// Returns an error if:
/// - the logging/tracing configuration cannot be initialised,
/// - the care data directory does not exist,
/// - the server address cannot be bound, or
/// - the HTTP server fails while running.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let addr = std::env::var("CAREBOOK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("-- Starting Carebook REST API on {}", addr);

    let care_data_dir = std::env::var("CARE_DATA_DIR")
        .unwrap_or_else(|_| carebook_core::DEFAULT_CARE_DATA_DIR.into());
    let care_data_path = Path::new(&care_data_dir);
    if !care_data_path.exists() {
        anyhow::bail!(
            "Care data directory does not exist: {}",
            care_data_path.display()
        );
    }

    let cfg = Arc::new(CoreConfig::new(care_data_path.to_path_buf())?);
    let state = AppState::new(cfg);

    api_rest::serve(&addr, state).await?;

    Ok(())
}
