mod config;
mod errors;
mod llm_client;
mod menus;
mod models;
mod qa;
mod routes;
mod state;
mod store;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::{LlmClient, ModelProvider};
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::MenuStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting AllerLens API v{}", env!("CARGO_PKG_VERSION"));

    // Upload directory must exist before the first multipart write lands
    tokio::fs::create_dir_all(&config.upload_dir).await?;
    info!("Upload directory: {}", config.upload_dir.display());

    // Initialize LLM client
    let llm: Arc<dyn ModelProvider> = Arc::new(LlmClient::new(config.anthropic_api_key.clone()));
    info!("LLM client initialized (model: {})", llm_client::MODEL);

    // Initialize the bounded in-memory menu store
    let store = Arc::new(MenuStore::new(config.menu_store_capacity));
    info!("Menu store initialized (capacity: {})", config.menu_store_capacity);

    // Build app state
    let state = AppState {
        store,
        llm,
        config: config.clone(),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: tighten CORS in production

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
