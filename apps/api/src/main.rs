mod config;
mod errors;
mod evaluation;
mod llm_client;
mod providers;
mod retrieval;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::providers::{HttpEmbedder, LlmQueryRewriter};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing or invalid env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting resume evaluation API v{}", env!("CARGO_PKG_VERSION"));

    // Chat model: extraction, rubrics, comparison and query rewriting
    let llm = LlmClient::new(
        &config.llm_base_url,
        config.llm_api_key.clone(),
        config.llm_model.clone(),
        config.provider_timeout,
    )
    .context("Failed to build LLM client")?;
    info!("LLM client initialized (model: {})", llm.model());

    let embedder = HttpEmbedder::new(
        &config.embedding_base_url,
        config.embedding_api_key.clone(),
        config.embedding_model.clone(),
        config.provider_timeout,
    )?;
    info!("Embedding client initialized (model: {})", config.embedding_model);

    let rewriter = LlmQueryRewriter::new(llm.clone());

    info!(
        retriever = %config.retrieval.retriever,
        chunk_size = config.retrieval.chunk_size,
        chunk_overlap = config.retrieval.chunk_overlap,
        top_k = config.retrieval.top_k,
        query_variants = config.retrieval.fusion.num_query_variants(),
        "Retrieval settings"
    );

    let state = AppState {
        llm,
        embedder: Arc::new(embedder),
        rewriter: Arc::new(rewriter),
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port)
        .parse()
        .context("HOST and PORT must form a valid socket address")?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
