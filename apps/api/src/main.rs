mod config;
mod correction;
mod errors;
mod export;
mod grading;
mod llm_client;
mod models;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::grading::corpora::GradingContext;
use crate::llm_client::LlmClient;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing OPENROUTER_KEY)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Corretor API v{}", env!("CARGO_PKG_VERSION"));
    info!("Run mode: {:?}", config.run_mode);

    // Both corpora must load; a partial grading context is never served
    let grading = GradingContext::load(&config.corpus_dir).await?;

    // Initialize completion client
    let llm = LlmClient::new(
        config.openrouter_key.clone(),
        config.completion_url.clone(),
        config.completion_timeout,
    )?;
    info!(
        "Completion client initialized (model: {}, timeout: {}s)",
        llm_client::MODEL,
        config.completion_timeout.as_secs()
    );

    let state = AppState {
        completion: Arc::new(llm),
        grading,
        config: config.clone(),
    };

    let app = build_router(state).layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
