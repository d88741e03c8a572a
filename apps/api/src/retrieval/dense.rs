//! Dense Retriever — cosine similarity over chunk embeddings.
//!
//! Chunk embeddings are computed once at build time. Each query costs exactly
//! one embedding call.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info};

use crate::retrieval::error::RetrievalError;
use crate::retrieval::types::{rank_candidates, ChunkSet, ScoredResult};

/// Maps text to a fixed-dimension vector.
///
/// Implementations must return vectors of the same dimension for every input.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Provider name, used in logs.
    fn name(&self) -> &str;

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>>;

    /// Embeds many texts, preserving input order.
    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

pub struct DenseIndex {
    chunks: ChunkSet,
    embeddings: Vec<Vec<f32>>,
    /// 0 for an empty index.
    dimension: usize,
    embedder: Arc<dyn Embedder>,
}

impl std::fmt::Debug for DenseIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DenseIndex")
            .field("chunks", &self.chunks.len())
            .field("dimension", &self.dimension)
            .field("embedder", &self.embedder.name())
            .finish()
    }
}

impl DenseIndex {
    /// Embeds every chunk. Fails if the provider errors or returns vectors of
    /// inconsistent dimension; no partial index is produced.
    pub async fn build(
        chunks: ChunkSet,
        embedder: Arc<dyn Embedder>,
    ) -> Result<Self, RetrievalError> {
        if chunks.is_empty() {
            return Ok(Self {
                chunks,
                embeddings: Vec::new(),
                dimension: 0,
                embedder,
            });
        }

        let texts: Vec<String> = chunks.iter().map(|c| c.text().to_string()).collect();
        let embeddings = embedder
            .embed_batch(&texts)
            .await
            .map_err(|e| RetrievalError::EmbeddingUnavailable(format!("{e:#}")))?;

        if embeddings.len() != chunks.len() {
            return Err(RetrievalError::EmbeddingUnavailable(format!(
                "{} returned {} embeddings for {} chunks",
                embedder.name(),
                embeddings.len(),
                chunks.len()
            )));
        }

        let dimension = embeddings[0].len();
        if dimension == 0 {
            return Err(RetrievalError::EmbeddingUnavailable(format!(
                "{} returned an empty embedding",
                embedder.name()
            )));
        }
        if let Some(position) = embeddings.iter().position(|v| v.len() != dimension) {
            return Err(RetrievalError::EmbeddingUnavailable(format!(
                "embedding {position} has dimension {}, expected {dimension}",
                embeddings[position].len()
            )));
        }

        info!(
            chunks = chunks.len(),
            dimension,
            provider = embedder.name(),
            "Built dense index"
        );

        Ok(Self {
            chunks,
            embeddings,
            dimension,
            embedder,
        })
    }

    /// Embeds the query and returns up to `top_k` chunks by descending cosine
    /// similarity, ties broken by insertion order.
    pub async fn query(
        &self,
        text: &str,
        top_k: usize,
    ) -> Result<Vec<ScoredResult>, RetrievalError> {
        if self.chunks.is_empty() || top_k == 0 {
            return Ok(Vec::new());
        }

        let query = self
            .embedder
            .embed(text)
            .await
            .map_err(|e| RetrievalError::EmbeddingUnavailable(format!("{e:#}")))?;

        if query.len() != self.dimension {
            return Err(RetrievalError::EmbeddingUnavailable(format!(
                "query embedding has dimension {}, index has {}",
                query.len(),
                self.dimension
            )));
        }

        let candidates: Vec<(usize, f32)> = self
            .embeddings
            .iter()
            .enumerate()
            .map(|(ordinal, embedding)| (ordinal, cosine_similarity(&query, embedding)))
            .collect();

        debug!(candidates = candidates.len(), top_k, "Scored dense query");
        Ok(rank_candidates(&self.chunks, candidates, top_k))
    }
}

/// Cosine similarity of two equal-length vectors. A zero-norm side gives 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    let mut dot = 0.0_f32;
    let mut norm_a = 0.0_f32;
    let mut norm_b = 0.0_f32;
    for (x, y) in a.iter().zip(b) {
        dot += x * y;
        norm_a += x * x;
        norm_b += y * y;
    }
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a.sqrt() * norm_b.sqrt())
}
