//! Hybrid retrieval over job-description chunks.
//!
//! Bottom-up: `chunker` → `lexical` / `dense` → `fusion` → `handle`.
//! Every index is built once over one `ChunkSet` and only read afterwards, so
//! handles can be queried concurrently without locking. Providers are
//! injected as `Arc<dyn Embedder>` / `Arc<dyn QueryRewriter>`; nothing here
//! reads process-wide settings.

pub mod chunker;
pub mod dense;
pub mod error;
pub mod fusion;
pub mod handle;
pub mod lexical;
pub mod tokenizer;
pub mod types;

#[cfg(test)]
pub(crate) mod test_support;

pub use dense::{DenseIndex, Embedder};
pub use error::RetrievalError;
pub use fusion::{FusionConfig, FusionIndex, QueryRewriter};
pub use handle::{job_context, retrieve, RetrieverHandle, RetrieverKind};
pub use lexical::LexicalIndex;
pub use types::{Chunk, ChunkId, ChunkSet, ScoredResult};
