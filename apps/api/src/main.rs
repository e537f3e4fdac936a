mod analysis;
mod config;
mod documents;
mod errors;
mod json_body;
mod llm_client;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::analysis::InferenceGateway;
use crate::config::Config;
use crate::llm_client::{ModelBackend, OllamaClient};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on malformed env values)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Resume API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize the Ollama client
    let ollama = OllamaClient::new(config.ollama_base_url.clone(), config.ollama_timeout)?;
    info!(
        "Ollama client initialized (endpoint: {}, model: {})",
        ollama.base_url(),
        config.ollama_model
    );

    // Advisory only: the server may come up after us
    if !ollama.check_connection().await {
        warn!("Ollama is not reachable yet; analysis endpoints will return 503 until it is");
    }

    let gateway = InferenceGateway::new(Arc::new(ollama), config.ollama_model.clone());
    info!("Inference gateway ready (model: {})", gateway.model());

    // Build app state
    let state = AppState { gateway };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict CORS to the UI origin once it has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
