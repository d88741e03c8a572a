//! Retrieval Facade — one `retrieve` entry point over every index kind.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::retrieval::dense::{DenseIndex, Embedder};
use crate::retrieval::error::RetrievalError;
use crate::retrieval::fusion::{FusionConfig, FusionIndex, QueryRewriter};
use crate::retrieval::lexical::LexicalIndex;
use crate::retrieval::types::{ChunkSet, ScoredResult};

/// Separator between passages in the job context handed to comparison.
pub const CONTEXT_SEPARATOR: &str = ".\n";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RetrieverKind {
    Lexical,
    Dense,
    Fusion,
}

impl FromStr for RetrieverKind {
    type Err = RetrievalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lexical" | "bm25" => Ok(Self::Lexical),
            "dense" | "vector" => Ok(Self::Dense),
            "fusion" | "hybrid" | "query_fusion" => Ok(Self::Fusion),
            other => Err(RetrievalError::UnsupportedHandle(other.to_string())),
        }
    }
}

impl fmt::Display for RetrieverKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Lexical => "lexical",
            Self::Dense => "dense",
            Self::Fusion => "fusion",
        })
    }
}

/// A constructed, read-only index.
#[derive(Debug)]
pub enum RetrieverHandle {
    Lexical(LexicalIndex),
    Dense(DenseIndex),
    Fusion(FusionIndex),
}

impl RetrieverHandle {
    /// Builds the index `kind` names over `chunks`. Providers not used by
    /// that kind are ignored.
    pub async fn build(
        kind: RetrieverKind,
        chunks: ChunkSet,
        embedder: Arc<dyn Embedder>,
        rewriter: Arc<dyn QueryRewriter>,
        config: FusionConfig,
    ) -> Result<Self, RetrievalError> {
        Ok(match kind {
            RetrieverKind::Lexical => Self::Lexical(LexicalIndex::build(chunks)),
            RetrieverKind::Dense => Self::Dense(DenseIndex::build(chunks, embedder).await?),
            RetrieverKind::Fusion => {
                Self::Fusion(FusionIndex::build(chunks, embedder, rewriter, config).await)
            }
        })
    }

    /// True for a fusion index running without its dense leg.
    pub fn degraded(&self) -> bool {
        matches!(self, Self::Fusion(index) if index.degraded())
    }

    pub fn kind(&self) -> RetrieverKind {
        match self {
            Self::Lexical(_) => RetrieverKind::Lexical,
            Self::Dense(_) => RetrieverKind::Dense,
            Self::Fusion(_) => RetrieverKind::Fusion,
        }
    }
}

/// Queries whichever index `handle` holds.
pub async fn retrieve(
    handle: &RetrieverHandle,
    query: &str,
    top_k: usize,
) -> Result<Vec<ScoredResult>, RetrievalError> {
    if top_k == 0 {
        return Err(RetrievalError::InvalidConfig(
            "top_k must be at least 1".to_string(),
        ));
    }

    match handle {
        RetrieverHandle::Lexical(index) => Ok(index.query(query, top_k)),
        RetrieverHandle::Dense(index) => index.query(query, top_k).await,
        RetrieverHandle::Fusion(index) => Ok(index.query(query, top_k).await),
    }
}

/// Joins result texts in rank order.
pub fn job_context(results: &[ScoredResult]) -> String {
    results
        .iter()
        .map(|r| r.chunk.text())
        .collect::<Vec<_>>()
        .join(CONTEXT_SEPARATOR)
}
