use std::str::FromStr;
use std::time::Duration;

use anyhow::{Context, Result};

use crate::retrieval::chunker::validate_window;
use crate::retrieval::{FusionConfig, RetrievalError, RetrieverKind};

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub llm_api_key: String,
    pub llm_base_url: String,
    pub llm_model: String,
    pub embedding_api_key: String,
    pub embedding_base_url: String,
    pub embedding_model: String,
    /// Applied to every provider HTTP call.
    pub provider_timeout: Duration,
    pub retrieval: RetrievalSettings,
    pub host: String,
    pub port: u16,
    pub rust_log: String,
}

/// Chunking and retrieval parameters, validated as a unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetrievalSettings {
    pub retriever: RetrieverKind,
    pub chunk_size: usize,
    pub chunk_overlap: usize,
    /// Final number of passages returned.
    pub top_k: usize,
    pub fusion: FusionConfig,
}

impl RetrievalSettings {
    pub fn new(
        retriever: RetrieverKind,
        chunk_size: usize,
        chunk_overlap: usize,
        top_k: usize,
        num_query_variants: usize,
    ) -> Result<Self, RetrievalError> {
        validate_window(chunk_size, chunk_overlap)?;
        // The fusion legs retrieve as deep as the final cut.
        let fusion = FusionConfig::new(num_query_variants, top_k)?;
        Ok(Self {
            retriever,
            chunk_size,
            chunk_overlap,
            top_k,
            fusion,
        })
    }
}

impl Default for RetrievalSettings {
    fn default() -> Self {
        Self {
            retriever: RetrieverKind::Fusion,
            chunk_size: 100,
            chunk_overlap: 10,
            top_k: 3,
            fusion: FusionConfig::default(),
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let or_default =
            |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let retriever: RetrieverKind = or_default("RETRIEVER", "fusion")
            .parse()
            .context("RETRIEVER must be one of lexical, dense, fusion")?;

        let retrieval = RetrievalSettings::new(
            retriever,
            parse_var(&lookup, "CHUNK_SIZE", 100)?,
            parse_var(&lookup, "CHUNK_OVERLAP", 10)?,
            parse_var(&lookup, "RETRIEVAL_TOP_K", 3)?,
            parse_var(&lookup, "NUM_QUERY_VARIANTS", 3)?,
        )
        .context("Invalid retrieval settings")?;

        Ok(Config {
            llm_api_key: require("LLM_API_KEY")?,
            llm_base_url: or_default("LLM_BASE_URL", "https://openrouter.ai/api/v1"),
            llm_model: or_default("LLM_MODEL", "gpt-4o-mini"),
            embedding_api_key: require("EMBEDDING_API_KEY")?,
            embedding_base_url: or_default("EMBEDDING_BASE_URL", "https://api.mistral.ai/v1"),
            embedding_model: or_default("EMBEDDING_MODEL", "mistral-embed"),
            provider_timeout: Duration::from_secs(parse_var(&lookup, "PROVIDER_TIMEOUT_SECS", 60)?),
            retrieval,
            host: or_default("HOST", "0.0.0.0"),
            port: parse_var(&lookup, "PORT", 8501)?,
            rust_log: or_default("RUST_LOG", "info"),
        })
    }
}

fn parse_var<T>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} has an invalid value '{raw}'")),
        None => Ok(default),
    }
}
