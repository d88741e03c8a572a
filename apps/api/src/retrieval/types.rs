//! Core retrieval data types: chunks, chunk sets, and scored results.

use std::fmt;
use std::sync::Arc;

use serde::Serialize;

use crate::retrieval::error::RetrievalError;

/// Opaque chunk identifier.
///
/// Holds the ordinal of the chunk inside the set that produced it, so id order
/// is insertion order. Every retriever uses it as the final tie-break.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct ChunkId(usize);

impl ChunkId {
    pub(crate) fn from_ordinal(ordinal: usize) -> Self {
        Self(ordinal)
    }

    pub fn ordinal(self) -> usize {
        self.0
    }
}

impl fmt::Display for ChunkId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "chunk-{}", self.0)
    }
}

/// A token-bounded segment of one source document. Immutable once created.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Chunk {
    id: ChunkId,
    text: String,
    /// Token offset of the chunk's first token in the source text.
    source_offset: usize,
}

impl Chunk {
    pub(crate) fn new(id: ChunkId, text: String, source_offset: usize) -> Self {
        Self {
            id,
            text,
            source_offset,
        }
    }

    pub fn id(&self) -> ChunkId {
        self.id
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn source_offset(&self) -> usize {
        self.source_offset
    }
}

/// The immutable chunk collection an index is built over.
///
/// Cheap to clone: every index built from the same set shares one allocation,
/// which is what lets the fusion engine run both retrievers over identical chunks.
#[derive(Debug, Clone)]
pub struct ChunkSet {
    chunks: Arc<[Chunk]>,
}

impl ChunkSet {
    /// Wraps chunker output. Ids must be unique and increasing, i.e. the chunks
    /// come from a single `split` call in their original order.
    pub fn new(chunks: Vec<Chunk>) -> Result<Self, RetrievalError> {
        if let Some(pair) = chunks.windows(2).find(|pair| pair[0].id >= pair[1].id) {
            return Err(RetrievalError::InvalidConfig(format!(
                "chunk ids must be unique and in insertion order ({} followed by {})",
                pair[0].id, pair[1].id
            )));
        }
        Ok(Self {
            chunks: chunks.into(),
        })
    }

    /// Builds a set from texts that were already split by the caller.
    /// Offsets are counted as if the texts were concatenated in order.
    pub fn from_texts<I, S>(texts: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut offset = 0;
        let chunks: Vec<Chunk> = texts
            .into_iter()
            .enumerate()
            .map(|(ordinal, text)| {
                let text = text.into();
                let chunk = Chunk::new(ChunkId::from_ordinal(ordinal), text, offset);
                offset += chunk.text.split_whitespace().count();
                chunk
            })
            .collect();
        Self {
            chunks: chunks.into(),
        }
    }

    pub fn empty() -> Self {
        Self {
            chunks: Vec::new().into(),
        }
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Chunk> + '_ {
        self.chunks.iter()
    }

    pub fn get(&self, ordinal: usize) -> Option<&Chunk> {
        self.chunks.get(ordinal)
    }
}

/// A chunk returned by a retriever, with its score and 1-based rank.
///
/// Score semantics depend on the retriever that produced it:
/// - **Lexical**: BM25 relevance
/// - **Dense**: cosine similarity
/// - **Fusion**: reciprocal-rank-fusion score
///
/// Scores from different retrievers are never compared directly.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoredResult {
    pub chunk: Chunk,
    pub score: f32,
    pub rank: usize,
}

/// Orders `(ordinal, score)` candidates by descending score, breaking ties by
/// insertion order, keeps the first `top_k` and assigns ranks 1..=k.
pub(crate) fn rank_candidates(
    chunks: &ChunkSet,
    mut candidates: Vec<(usize, f32)>,
    top_k: usize,
) -> Vec<ScoredResult> {
    candidates.sort_by(|a, b| b.1.total_cmp(&a.1).then(a.0.cmp(&b.0)));
    candidates
        .into_iter()
        .filter_map(|(ordinal, score)| chunks.get(ordinal).map(|chunk| (chunk, score)))
        .take(top_k)
        .enumerate()
        .map(|(position, (chunk, score))| ScoredResult {
            chunk: chunk.clone(),
            score,
            rank: position + 1,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_texts_assigns_ordinal_ids_and_offsets() {
        let set = ChunkSet::from_texts(["rust systems", "python data science", "go"]);
        assert_eq!(set.len(), 3);
        let offsets: Vec<usize> = set.iter().map(|c| c.source_offset()).collect();
        assert_eq!(offsets, vec![0, 2, 5]);
        let ids: Vec<usize> = set.iter().map(|c| c.id().ordinal()).collect();
        assert_eq!(ids, vec![0, 1, 2]);
    }

    #[test]
    fn test_chunk_id_keeps_large_ordinals() {
        let ordinal = u32::MAX as usize + 7;
        let id = ChunkId::from_ordinal(ordinal);
        assert_eq!(id.ordinal(), ordinal);
        assert!(ChunkId::from_ordinal(ordinal - 1) < id);
        assert_eq!(id.to_string(), format!("chunk-{ordinal}"));
    }

    #[test]
    fn test_new_rejects_out_of_order_ids() {
        let chunks = vec![
            Chunk::new(ChunkId::from_ordinal(1), "b".to_string(), 0),
            Chunk::new(ChunkId::from_ordinal(0), "a".to_string(), 0),
        ];
        let err = ChunkSet::new(chunks).unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidConfig(_)));
    }

    #[test]
    fn test_new_rejects_duplicate_ids() {
        let chunks = vec![
            Chunk::new(ChunkId::from_ordinal(0), "a".to_string(), 0),
            Chunk::new(ChunkId::from_ordinal(0), "b".to_string(), 1),
        ];
        assert!(ChunkSet::new(chunks).is_err());
    }

    #[test]
    fn test_rank_candidates_breaks_ties_by_insertion_order() {
        let set = ChunkSet::from_texts(["a", "b", "c", "d"]);
        let ranked = rank_candidates(&set, vec![(3, 0.5), (1, 0.9), (2, 0.5), (0, 0.1)], 3);
        let order: Vec<usize> = ranked.iter().map(|r| r.chunk.id().ordinal()).collect();
        assert_eq!(order, vec![1, 2, 3]);
        let ranks: Vec<usize> = ranked.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[test]
    fn test_rank_candidates_returns_all_when_fewer_than_k() {
        let set = ChunkSet::from_texts(["a", "b"]);
        let ranked = rank_candidates(&set, vec![(0, 1.0), (1, 2.0)], 10);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].chunk.text(), "b");
    }
}
