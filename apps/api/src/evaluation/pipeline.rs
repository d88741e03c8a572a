//! Evaluation pipeline — one resume against one job description.
//!
//! Sequential by design: extract candidate → normalize JD → rubrics →
//! chunk + index → retrieve → compare. The index lives only for the
//! duration of one evaluation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use tracing::info;
use uuid::Uuid;

use crate::config::RetrievalSettings;
use crate::errors::AppError;
use crate::evaluation::candidate::{extract_candidate, CandidateInfo};
use crate::evaluation::compare::{compare_candidate, CompareResult};
use crate::evaluation::preprocess::normalize_job_description;
use crate::evaluation::rubrics::{extract_rubrics, Rubrics};
use crate::retrieval::chunker::split;
use crate::retrieval::{
    job_context, retrieve, ChunkId, ChunkSet, Embedder, QueryRewriter, RetrieverHandle,
    RetrieverKind, ScoredResult,
};
use crate::state::AppState;

/// Fixed query used to pull the scoring-relevant parts of a job description.
pub const RETRIEVAL_QUERY: &str = "Which part can I use for CV scoring?";

#[derive(Debug, Clone, Serialize)]
pub struct ContextPassage {
    pub chunk_id: ChunkId,
    pub text: String,
    pub score: f32,
    pub rank: usize,
}

impl From<ScoredResult> for ContextPassage {
    fn from(result: ScoredResult) -> Self {
        Self {
            chunk_id: result.chunk.id(),
            text: result.chunk.text().to_string(),
            score: result.score,
            rank: result.rank,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct RetrievedContext {
    pub retriever: RetrieverKind,
    /// Fusion ran without its dense leg.
    pub degraded: bool,
    pub chunk_count: usize,
    pub passages: Vec<ContextPassage>,
    pub job_context: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct EvaluationReport {
    pub evaluation_id: Uuid,
    pub evaluated_at: DateTime<Utc>,
    pub retriever: RetrieverKind,
    pub retrieval_degraded: bool,
    pub candidate: CandidateInfo,
    pub rubrics: Rubrics,
    pub passages: Vec<ContextPassage>,
    pub job_context: String,
    pub comparison: CompareResult,
}

/// Chunks an already-normalized job description, builds the configured index
/// and runs `query` against it.
pub async fn retrieve_job_context(
    job_description: &str,
    query: &str,
    settings: &RetrievalSettings,
    embedder: Arc<dyn Embedder>,
    rewriter: Arc<dyn QueryRewriter>,
) -> Result<RetrievedContext, AppError> {
    let chunks = ChunkSet::new(split(
        job_description,
        settings.chunk_size,
        settings.chunk_overlap,
    )?)?;
    let chunk_count = chunks.len();

    let handle = RetrieverHandle::build(
        settings.retriever,
        chunks,
        embedder,
        rewriter,
        settings.fusion,
    )
    .await?;
    let results = retrieve(&handle, query, settings.top_k).await?;

    info!(
        retriever = %handle.kind(),
        chunks = chunk_count,
        results = results.len(),
        degraded = handle.degraded(),
        "Retrieved job context"
    );

    let job_context = job_context(&results);
    Ok(RetrievedContext {
        retriever: handle.kind(),
        degraded: handle.degraded(),
        chunk_count,
        passages: results.into_iter().map(ContextPassage::from).collect(),
        job_context,
    })
}

/// Runs the full evaluation for one resume.
pub async fn evaluate(
    state: &AppState,
    resume_text: &str,
    job_description: &str,
) -> Result<EvaluationReport, AppError> {
    if resume_text.trim().is_empty() {
        return Err(AppError::Validation("Resume text is empty".to_string()));
    }
    let normalized_jd = normalize_job_description(job_description);
    if normalized_jd.is_empty() {
        return Err(AppError::Validation(
            "Job description has no usable text".to_string(),
        ));
    }

    let evaluation_id = Uuid::new_v4();
    info!(%evaluation_id, "Starting evaluation");

    let candidate = extract_candidate(&state.llm, resume_text).await?;
    let rubrics = extract_rubrics(&state.llm, &normalized_jd).await?;

    let context = retrieve_job_context(
        &normalized_jd,
        RETRIEVAL_QUERY,
        &state.config.retrieval,
        state.embedder.clone(),
        state.rewriter.clone(),
    )
    .await?;

    let comparison =
        compare_candidate(&state.llm, &candidate, &rubrics, &context.job_context).await?;

    info!(
        %evaluation_id,
        cv_match_score = comparison.cv_match_score,
        project_score = comparison.project_score,
        "Evaluation complete"
    );

    Ok(EvaluationReport {
        evaluation_id,
        evaluated_at: Utc::now(),
        retriever: context.retriever,
        retrieval_degraded: context.degraded,
        candidate,
        rubrics,
        passages: context.passages,
        job_context: context.job_context,
        comparison,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::retrieval::test_support::{
        FailingEmbedder, KeywordEmbedder, StaticRewriter, JOB_DESCRIPTION_CHUNKS, SCENARIO_QUERY,
    };

    fn job_description() -> String {
        normalize_job_description(&JOB_DESCRIPTION_CHUNKS.join(". "))
    }

    fn settings(retriever: RetrieverKind, top_k: usize) -> RetrievalSettings {
        RetrievalSettings::new(retriever, 8, 2, top_k, 2).unwrap()
    }

    #[tokio::test]
    async fn test_retrieve_job_context_builds_passages_in_rank_order() {
        let context = retrieve_job_context(
            &job_description(),
            SCENARIO_QUERY,
            &settings(RetrieverKind::Fusion, 2),
            Arc::new(KeywordEmbedder),
            Arc::new(StaticRewriter::new(&["python skills"])),
        )
        .await
        .unwrap();

        assert_eq!(context.retriever, RetrieverKind::Fusion);
        assert!(!context.degraded);
        assert!(context.chunk_count > 2);
        assert_eq!(context.passages.len(), 2);
        assert_eq!(context.passages[0].rank, 1);
        assert_eq!(
            context.job_context,
            format!("{}.\n{}", context.passages[0].text, context.passages[1].text)
        );
        assert!(context.passages[0].text.contains("python"));
    }

    #[tokio::test]
    async fn test_retrieve_job_context_reports_degraded_fusion() {
        let context = retrieve_job_context(
            &job_description(),
            SCENARIO_QUERY,
            &settings(RetrieverKind::Fusion, 3),
            Arc::new(FailingEmbedder),
            Arc::new(StaticRewriter::new(&[])),
        )
        .await
        .unwrap();
        assert!(context.degraded);
        assert!(!context.passages.is_empty());
    }

    #[tokio::test]
    async fn test_dense_failure_is_an_error_outside_fusion() {
        let err = retrieve_job_context(
            &job_description(),
            SCENARIO_QUERY,
            &settings(RetrieverKind::Dense, 3),
            Arc::new(FailingEmbedder),
            Arc::new(StaticRewriter::new(&[])),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, AppError::Retrieval(_)));
    }

    #[tokio::test]
    async fn test_empty_job_description_yields_no_passages() {
        let context = retrieve_job_context(
            "",
            SCENARIO_QUERY,
            &settings(RetrieverKind::Lexical, 3),
            Arc::new(KeywordEmbedder),
            Arc::new(StaticRewriter::new(&[])),
        )
        .await
        .unwrap();
        assert_eq!(context.chunk_count, 0);
        assert!(context.passages.is_empty());
        assert_eq!(context.job_context, "");
    }
}
