use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use triplog::api;
use triplog::config::Config;
use triplog::storage::{CachedStorage, SqliteStorage, TripStore};
use triplog::timezone::TimezoneTable;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Load configuration
    let config = Config::from_env()?;
    info!("Loaded configuration");

    // Airport timezones are loaded once and shared read-only
    let timezones = TimezoneTable::load(&config.timezones.data_path).with_context(|| {
        format!(
            "Failed to load airport timezones from {}",
            config.timezones.data_path
        )
    })?;
    info!(
        "Loaded {} airport timezones from {}",
        timezones.len(),
        config.timezones.data_path
    );
    let timezones = Arc::new(timezones);

    // Initialize storage
    info!("Using SQLite storage: {}", config.database.url);
    let sqlite = SqliteStorage::new(&config.database.url, config.database.max_connections).await?;

    info!("Initializing database...");
    sqlite.init().await?;
    info!("Database initialized successfully");

    let storage: Arc<dyn TripStore> = Arc::new(CachedStorage::new(
        Arc::new(sqlite),
        config.cache.max_entries,
        config.cache.ttl_secs,
    ));

    let router = api::create_api_router(storage, timezones, config.trips);

    let api_addr = format!("{}:{}", config.api_server.host, config.api_server.port);
    let listener = tokio::net::TcpListener::bind(&api_addr).await?;
    info!("🚀 API server listening on http://{}", api_addr);
    info!("   - API endpoints available at http://{}/api/...", api_addr);

    axum::serve(listener, router).await?;

    Ok(())
}
