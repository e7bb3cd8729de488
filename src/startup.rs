use crate::{
    AppState,
    config::Config,
    db,
    errors::AppError,
    giphy::GiphyClient,
    repositories::SqliteStore,
    sessions::MemorySessionStore,
};
use std::sync::Arc;

/// Opens the database, builds the outbound client and wires the shared state.
pub async fn build_state(config: &Config) -> Result<Arc<AppState>, AppError> {
    tracing::info!("Startup: Initializing resources...");

    let pool = db::connect(&config.database_url).await.map_err(|e| {
        tracing::error!("Startup: Failed to prepare database: {:#}", e);
        AppError::InitError(format!("{:#}", e))
    })?;

    let http = reqwest::Client::builder()
        .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| AppError::InitError(format!("Failed to build HTTP client: {}", e)))?;
    let gif_search = GiphyClient::new(http, config.giphy_api_url.clone(), config.giphy_api_key.clone());

    let state = AppState::from_store(
        Arc::new(SqliteStore::new(pool)),
        Arc::new(gif_search),
        Arc::new(MemorySessionStore::new(config.session_ttl)),
    );

    tracing::info!("Startup: Resource initialization complete.");
    Ok(Arc::new(state))
}
