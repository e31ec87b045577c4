mod config;
mod errors;
mod llm_client;
mod models;
mod recommendation;
mod routes;
mod sow;
mod state;

use anyhow::Result;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::mock::MockCompletionProvider;
use crate::llm_client::{CompletionProvider, OpenAiClient};
use crate::recommendation::extractor::MarkdownPlaybookExtractor;
use crate::recommendation::service::RecommendationService;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on an unparseable PORT)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting recommender API v{}", env!("CARGO_PKG_VERSION"));

    // Select completion provider (deterministic mock or OpenAI-compatible HTTP)
    let provider: Arc<dyn CompletionProvider> = if config.use_mock_recommendations {
        info!("Using mock completion provider");
        Arc::new(MockCompletionProvider)
    } else {
        if config.openai_api_key.is_none() {
            warn!("OPENAI_API_KEY is not set; /api/recommendations will return configuration errors");
        }
        info!(
            "LLM client initialized (model: {}, base: {})",
            llm_client::MODEL,
            config.openai_base_url
        );
        Arc::new(OpenAiClient::new(
            config.openai_api_key.clone(),
            config.openai_base_url.clone(),
        ))
    };

    let extractor = Arc::new(MarkdownPlaybookExtractor::new()?);

    // Build app state
    let state = AppState {
        config: config.clone(),
        recommender: RecommendationService::new(provider, extractor),
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
