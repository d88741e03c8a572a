//! Query Fusion Engine — multi-query hybrid retrieval merged with
//! reciprocal rank fusion.
//!
//! Each query variant runs through both the lexical and the dense leg. The
//! resulting `2 * variants` ranked lists are merged by rank alone, so BM25 and
//! cosine scores never need calibrating against each other.
//!
//! Degradation:
//! - rewriter failure → the original query is the only variant
//! - dense build failure → lexical-only index for its whole lifetime
//! - dense query failure → that variant's dense list is dropped

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::retrieval::dense::{DenseIndex, Embedder};
use crate::retrieval::error::RetrievalError;
use crate::retrieval::lexical::LexicalIndex;
use crate::retrieval::types::{ChunkId, ChunkSet, ScoredResult};

/// RRF smoothing constant.
pub const RRF_K: f32 = 60.0;

/// Produces alternative phrasings of a query.
#[async_trait]
pub trait QueryRewriter: Send + Sync {
    fn name(&self) -> &str;

    /// Returns up to `n` query strings. The original may or may not be among
    /// them; the engine always puts it first itself.
    async fn rewrite(&self, query: &str, n: usize) -> anyhow::Result<Vec<String>>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FusionMode {
    #[default]
    ReciprocalRank,
}

/// Fixed at index construction time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FusionConfig {
    num_query_variants: usize,
    top_k: usize,
    mode: FusionMode,
}

impl FusionConfig {
    pub fn new(num_query_variants: usize, top_k: usize) -> Result<Self, RetrievalError> {
        if num_query_variants == 0 {
            return Err(RetrievalError::InvalidConfig(
                "num_query_variants must be at least 1".to_string(),
            ));
        }
        if top_k == 0 {
            return Err(RetrievalError::InvalidConfig(
                "fusion top_k must be at least 1".to_string(),
            ));
        }
        Ok(Self {
            num_query_variants,
            top_k,
            mode: FusionMode::ReciprocalRank,
        })
    }

    pub fn num_query_variants(&self) -> usize {
        self.num_query_variants
    }

    /// Depth of each per-leg ranked list fed into fusion.
    pub fn top_k(&self) -> usize {
        self.top_k
    }

    pub fn mode(&self) -> FusionMode {
        self.mode
    }
}

impl Default for FusionConfig {
    fn default() -> Self {
        Self {
            num_query_variants: 3,
            top_k: 3,
            mode: FusionMode::ReciprocalRank,
        }
    }
}

pub struct FusionIndex {
    lexical: LexicalIndex,
    /// `None` when the dense build failed.
    dense: Option<DenseIndex>,
    rewriter: Arc<dyn QueryRewriter>,
    config: FusionConfig,
}

impl std::fmt::Debug for FusionIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FusionIndex")
            .field("lexical", &self.lexical)
            .field("dense", &self.dense)
            .field("rewriter", &self.rewriter.name())
            .field("config", &self.config)
            .finish()
    }
}

impl FusionIndex {
    /// Builds both legs over the same chunk set. Never fails: a dense build
    /// error is logged and the index serves lexical results only.
    pub async fn build(
        chunks: ChunkSet,
        embedder: Arc<dyn Embedder>,
        rewriter: Arc<dyn QueryRewriter>,
        config: FusionConfig,
    ) -> Self {
        let lexical = LexicalIndex::build(chunks.clone());
        let dense = match DenseIndex::build(chunks, embedder).await {
            Ok(index) => Some(index),
            Err(e) => {
                warn!(error = %e, "Dense leg unavailable, fusion continues lexical-only");
                None
            }
        };

        Self {
            lexical,
            dense,
            rewriter,
            config,
        }
    }

    /// True when the dense leg could not be built.
    pub fn degraded(&self) -> bool {
        self.dense.is_none()
    }

    pub async fn query(&self, text: &str, top_k: usize) -> Vec<ScoredResult> {
        if self.lexical.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let variants = match self.query_variants(text).await {
            Ok(variants) => variants,
            Err(e) => {
                warn!(error = %e, "Query rewriting failed, using the original query only");
                vec![text.to_string()]
            }
        };

        let leg_k = self.config.top_k;
        let mut lists: Vec<Vec<ScoredResult>> = Vec::with_capacity(variants.len() * 2);

        for variant in &variants {
            lists.push(self.lexical.query(variant, leg_k));

            if let Some(dense) = &self.dense {
                match dense.query(variant, leg_k).await {
                    Ok(results) => lists.push(results),
                    Err(e) => {
                        warn!(
                            error = %e,
                            variant = %variant,
                            "Dense query failed, dropping its list"
                        );
                    }
                }
            }
        }

        debug!(
            variants = variants.len(),
            lists = lists.len(),
            top_k,
            "Fusing ranked lists"
        );

        match self.config.mode {
            FusionMode::ReciprocalRank => reciprocal_rank_fusion(&lists, RRF_K, top_k),
        }
    }

    async fn query_variants(&self, text: &str) -> Result<Vec<String>, RetrievalError> {
        let n = self.config.num_query_variants;
        if n <= 1 {
            return Ok(vec![text.to_string()]);
        }

        let generated = self
            .rewriter
            .rewrite(text, n)
            .await
            .map_err(|e| RetrievalError::RewriterUnavailable(format!("{e:#}")))?;

        Ok(merge_variants(text, generated, n))
    }
}

/// Original query first, then distinct non-empty generated queries, at most
/// `n` in total.
pub fn merge_variants(original: &str, generated: Vec<String>, n: usize) -> Vec<String> {
    let mut variants = vec![original.to_string()];
    for query in generated {
        if variants.len() >= n {
            break;
        }
        let query = query.trim();
        if query.is_empty() || variants.iter().any(|v| v.eq_ignore_ascii_case(query)) {
            continue;
        }
        variants.push(query.to_string());
    }
    variants
}

struct Fused {
    result: ScoredResult,
    score: f64,
    best_rank: usize,
}

/// Merges ranked lists by `Σ 1 / (k + rank)`.
///
/// Ties are broken by the best rank a chunk reached in any list, then by
/// insertion order. Returned ranks are re-assigned 1..=top_k and scores are
/// the fused scores.
pub fn reciprocal_rank_fusion(
    lists: &[Vec<ScoredResult>],
    k: f32,
    top_k: usize,
) -> Vec<ScoredResult> {
    let k = f64::from(k);
    let mut fused: HashMap<ChunkId, Fused> = HashMap::new();

    for list in lists {
        for result in list {
            let contribution = 1.0 / (k + result.rank as f64);
            fused
                .entry(result.chunk.id())
                .and_modify(|f| {
                    f.score += contribution;
                    f.best_rank = f.best_rank.min(result.rank);
                })
                .or_insert_with(|| Fused {
                    result: result.clone(),
                    score: contribution,
                    best_rank: result.rank,
                });
        }
    }

    let mut merged: Vec<Fused> = fused.into_values().collect();
    merged.sort_by(|a, b| {
        b.score
            .total_cmp(&a.score)
            .then(a.best_rank.cmp(&b.best_rank))
            .then(a.result.chunk.id().cmp(&b.result.chunk.id()))
    });

    merged
        .into_iter()
        .take(top_k)
        .enumerate()
        .map(|(position, f)| ScoredResult {
            chunk: f.result.chunk,
            score: f.score as f32,
            rank: position + 1,
        })
        .collect()
}
