//! Lexical Retriever — Okapi BM25 over stemmed chunk terms.
//!
//! The index is built once and read-only afterwards. Every chunk is a
//! candidate; chunks sharing no term with the query score 0 and rank last.

use std::collections::{HashMap, HashSet};

use tracing::debug;

use crate::retrieval::tokenizer::analyze;
use crate::retrieval::types::{rank_candidates, ChunkSet, ScoredResult};

/// Term frequency saturation.
const BM25_K1: f32 = 1.2;
/// Document length normalization.
const BM25_B: f32 = 0.75;

#[derive(Debug, Clone, Copy)]
struct Posting {
    ordinal: usize,
    term_frequency: u32,
}

/// BM25 index over a chunk set.
#[derive(Debug)]
pub struct LexicalIndex {
    chunks: ChunkSet,
    /// term → postings, in chunk insertion order
    postings: HashMap<String, Vec<Posting>>,
    doc_lengths: Vec<u32>,
    avg_doc_length: f32,
}

impl LexicalIndex {
    pub fn build(chunks: ChunkSet) -> Self {
        let mut postings: HashMap<String, Vec<Posting>> = HashMap::new();
        let mut doc_lengths = Vec::with_capacity(chunks.len());
        let mut total_length: u64 = 0;

        for (ordinal, chunk) in chunks.iter().enumerate() {
            let terms = analyze(chunk.text());
            doc_lengths.push(terms.len() as u32);
            total_length += terms.len() as u64;

            let mut term_frequencies: HashMap<String, u32> = HashMap::new();
            for term in terms {
                *term_frequencies.entry(term).or_insert(0) += 1;
            }
            for (term, term_frequency) in term_frequencies {
                postings.entry(term).or_default().push(Posting {
                    ordinal,
                    term_frequency,
                });
            }
        }

        let avg_doc_length = if chunks.is_empty() {
            0.0
        } else {
            total_length as f32 / chunks.len() as f32
        };

        debug!(
            chunks = chunks.len(),
            terms = postings.len(),
            avg_doc_length,
            "Built lexical index"
        );

        Self {
            chunks,
            postings,
            doc_lengths,
            avg_doc_length,
        }
    }

    /// Returns up to `top_k` chunks by descending BM25 score, ties broken by
    /// insertion order. Fewer chunks than `top_k` means all of them.
    pub fn query(&self, text: &str, top_k: usize) -> Vec<ScoredResult> {
        if self.chunks.is_empty() || top_k == 0 {
            return Vec::new();
        }

        let mut seen = HashSet::new();
        let terms: Vec<String> = analyze(text)
            .into_iter()
            .filter(|term| seen.insert(term.clone()))
            .collect();

        let n = self.chunks.len() as f32;
        let mut scores = vec![0.0_f32; self.chunks.len()];

        for term in &terms {
            let Some(postings) = self.postings.get(term) else {
                continue;
            };
            let df = postings.len() as f32;
            let idf = ((n - df + 0.5) / (df + 0.5) + 1.0).ln();

            for posting in postings {
                let ordinal = posting.ordinal;
                let dl = self.doc_lengths[ordinal] as f32;
                let tf = posting.term_frequency as f32;
                let tf_norm = (tf * (BM25_K1 + 1.0))
                    / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * dl / self.avg_doc_length));
                scores[ordinal] += idf * tf_norm;
            }
        }

        let candidates: Vec<(usize, f32)> = scores.into_iter().enumerate().collect();

        rank_candidates(&self.chunks, candidates, top_k)
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
