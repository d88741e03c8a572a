//! Deterministic provider stubs and fixtures shared by retrieval and route tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::retrieval::dense::Embedder;
use crate::retrieval::fusion::QueryRewriter;
use crate::retrieval::types::ChunkSet;

pub const SCENARIO_QUERY: &str = "programming language experience";

/// Five chunks: 0 and 3 are about the candidate's skills, the rest are perks.
pub const JOB_DESCRIPTION_CHUNKS: [&str; 5] = [
    "Strong Python programming experience with data pipelines",
    "We offer flexible working hours and remote work options",
    "Our office is located downtown near public transport",
    "Programming language experience with Python is a hard requirement here",
    "Team lunches every Friday and annual company retreat",
];

pub fn job_description_chunks() -> ChunkSet {
    ChunkSet::from_texts(JOB_DESCRIPTION_CHUNKS)
}

const VOCABULARY: [&str; 8] = [
    "python",
    "programming",
    "language",
    "experience",
    "work",
    "office",
    "team",
    "lunches",
];

fn keyword_vector(text: &str) -> Vec<f32> {
    let lowered = text.to_lowercase();
    let words: Vec<&str> = lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .collect();
    VOCABULARY
        .iter()
        .map(|term| words.iter().filter(|w| *w == term).count() as f32)
        .collect()
}

/// Bag-of-words over a fixed vocabulary.
pub struct KeywordEmbedder;

#[async_trait]
impl Embedder for KeywordEmbedder {
    fn name(&self) -> &str {
        "keyword"
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(keyword_vector(text))
    }
}

pub struct FailingEmbedder;

#[async_trait]
impl Embedder for FailingEmbedder {
    fn name(&self) -> &str {
        "failing"
    }

    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("embedding provider unreachable")
    }
}

/// Builds fine, then fails on every query embedding.
pub struct QueryFailingEmbedder;

#[async_trait]
impl Embedder for QueryFailingEmbedder {
    fn name(&self) -> &str {
        "query-failing"
    }

    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        anyhow::bail!("embedding provider timed out")
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| keyword_vector(t)).collect())
    }
}

/// Returns vectors whose dimension grows with the input position.
pub struct RaggedEmbedder;

#[async_trait]
impl Embedder for RaggedEmbedder {
    fn name(&self) -> &str {
        "ragged"
    }

    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![1.0; 3])
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok((0..texts.len()).map(|i| vec![1.0; i + 1]).collect())
    }
}

#[derive(Default)]
pub struct CountingEmbedder {
    batch_texts: AtomicUsize,
    single_calls: AtomicUsize,
}

impl CountingEmbedder {
    /// Total number of texts embedded through `embed_batch`.
    pub fn batch_texts(&self) -> usize {
        self.batch_texts.load(Ordering::SeqCst)
    }

    pub fn single_calls(&self) -> usize {
        self.single_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Embedder for CountingEmbedder {
    fn name(&self) -> &str {
        "counting"
    }

    async fn embed(&self, text: &str) -> anyhow::Result<Vec<f32>> {
        self.single_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![1.0, text.len() as f32, 0.5])
    }

    async fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.batch_texts.fetch_add(texts.len(), Ordering::SeqCst);
        Ok(texts
            .iter()
            .map(|t| vec![1.0, t.len() as f32, 0.5])
            .collect())
    }
}

/// Returns a fixed list of generated queries and counts calls.
pub struct StaticRewriter {
    generated: Vec<String>,
    calls: AtomicUsize,
}

impl StaticRewriter {
    pub fn new(generated: &[&str]) -> Self {
        Self {
            generated: generated.iter().map(|s| s.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl QueryRewriter for StaticRewriter {
    fn name(&self) -> &str {
        "static"
    }

    async fn rewrite(&self, _query: &str, _n: usize) -> anyhow::Result<Vec<String>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.generated.clone())
    }
}

pub struct FailingRewriter;

#[async_trait]
impl QueryRewriter for FailingRewriter {
    fn name(&self) -> &str {
        "failing"
    }

    async fn rewrite(&self, _query: &str, _n: usize) -> anyhow::Result<Vec<String>> {
        anyhow::bail!("language model unreachable")
    }
}

/// Same vector for every input, so every cosine similarity is equal.
pub struct UniformEmbedder;

#[async_trait]
impl Embedder for UniformEmbedder {
    fn name(&self) -> &str {
        "uniform"
    }

    async fn embed(&self, _text: &str) -> anyhow::Result<Vec<f32>> {
        Ok(vec![1.0; 4])
    }
}
