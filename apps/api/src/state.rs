use std::sync::Arc;

use crate::config::Config;
use crate::llm_client::LlmClient;
use crate::retrieval::{Embedder, QueryRewriter};

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Embedding capability handed to every dense or fusion index.
    pub embedder: Arc<dyn Embedder>,
    /// Query rewriting capability for the fusion engine.
    pub rewriter: Arc<dyn QueryRewriter>,
    pub config: Config,
}
