use api_rest::AppState;
use carebook_core::CoreConfig;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Main entry point for the Carebook service
///
/// Boots the REST API (with OpenAPI/Swagger UI) over the document store.
/// Creates the care data directory on first run so a fresh deployment
/// starts from an empty store.
///
/// # Environment Variables
/// - `CAREBOOK_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CARE_DATA_DIR`: Root of the document store (default: "/care_data")
///
/// # Returns
/// * `Ok(())` - If the server starts and runs successfully
/// * `Err(anyhow::Error)` - If startup or runtime fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("carebook=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let rest_addr =
        std::env::var("CAREBOOK_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());
    let care_data_dir = std::env::var("CARE_DATA_DIR")
        .unwrap_or_else(|_| carebook_core::DEFAULT_CARE_DATA_DIR.into());

    tracing::info!("++ Starting Carebook REST on {}", rest_addr);
    tracing::info!("++ Using care data directory {}", care_data_dir);

    let care_data_path = Path::new(&care_data_dir);
    std::fs::create_dir_all(care_data_path)?;

    let cfg = Arc::new(CoreConfig::new(care_data_path.to_path_buf())?);
    let state = AppState::new(cfg);

    api_rest::serve(&rest_addr, state).await?;

    Ok(())
}
