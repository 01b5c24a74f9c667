//! QuickShare API Server
//!
//! Serves uploads, file listings, and text posts.

use std::sync::Arc;

use anyhow::Context;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use quickshare_api::{AppState, create_router};
use quickshare_core::files::FileCatalog;
use quickshare_core::storage::{StorageConfig, StorageService};
use quickshare_db::connect_with_pool;
use quickshare_shared::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "quickshare=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = AppConfig::load().context("Failed to load configuration")?;

    // Connect to database
    let db = connect_with_pool(
        &config.database.url,
        config.database.max_connections,
        config.database.min_connections,
    )
    .await?;
    info!("Connected to database");

    // Object storage
    let storage_config = StorageConfig::from_settings(&config.storage, &config.backend)?;
    let storage = StorageService::from_config(storage_config)?;
    info!(
        provider = storage.provider_name(),
        bucket = storage.bucket(),
        prefix = storage.prefix(),
        "Storage configured"
    );
    let catalog = FileCatalog::with_count_ttl(Arc::new(storage), config.listing.count_ttl_secs);

    // Create router
    let state = AppState::new(db, catalog, config.listing.page_size);
    let app = create_router(state);

    // Start server
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
