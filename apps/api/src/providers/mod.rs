//! HTTP-backed implementations of the retrieval capabilities.

pub mod embedding;
pub mod rewriter;

pub use embedding::HttpEmbedder;
pub use rewriter::LlmQueryRewriter;
