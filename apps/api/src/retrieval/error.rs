use thiserror::Error;

/// Errors surfaced by the retrieval core.
///
/// Building an index over zero chunks is not an error: the resulting index
/// answers every query with an empty result list.
#[derive(Debug, Error)]
pub enum RetrievalError {
    /// Bad chunker or fusion parameters. The caller must fix its input.
    #[error("Invalid retrieval configuration: {0}")]
    InvalidConfig(String),

    /// The embedding provider failed or returned a vector of the wrong shape.
    #[error("Embedding provider unavailable: {0}")]
    EmbeddingUnavailable(String),

    /// The query rewriter failed. The fusion engine degrades to the original query.
    #[error("Query rewriter unavailable: {0}")]
    RewriterUnavailable(String),

    /// A retriever was requested that this build does not know how to construct.
    #[error("Unsupported retriever: {0}")]
    UnsupportedHandle(String),
}
