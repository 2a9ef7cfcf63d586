use anyhow::Result;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::EnvFilter;

use web::{AppState, config::AppConfig, routes};

#[tokio::main]
async fn main() -> Result<()> {
    let config = AppConfig::load()?;

    // RUST_LOG wins over the configured level
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))?;
    tracing_subscriber::fmt().with_env_filter(filter).init();

    info!("Starting web service");
    info!("Auth provider: {}", config.auth.base_url);
    info!("Catalog: {}", config.catalog.base_url);

    let state = AppState::from_config(&config)?;
    let app = routes::create_router(state);

    let listener = TcpListener::bind(&config.listen_addr).await?;
    info!("Web service listening on {}", config.listen_addr);

    axum::serve(listener, app).await?;

    Ok(())
}
