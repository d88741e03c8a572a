use axum::{
    extract::{Multipart, State},
    Json,
};
use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::config::RetrievalSettings;
use crate::errors::AppError;
use crate::evaluation::pipeline::{
    evaluate, retrieve_job_context, ContextPassage, EvaluationReport,
};
use crate::evaluation::preprocess::{
    collapse_whitespace, extract_pdf_text, normalize_job_description,
};
use crate::retrieval::RetrieverKind;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct TextEvaluationRequest {
    pub resume_text: String,
    pub job_description: String,
}

#[derive(Debug, Deserialize)]
pub struct RetrieveRequest {
    pub job_description: String,
    pub query: String,
    pub top_k: Option<usize>,
    /// Overrides the configured retriever for this request.
    pub retriever: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct RetrieveResponse {
    pub retriever: RetrieverKind,
    pub degraded: bool,
    pub chunk_count: usize,
    pub results: Vec<ContextPassage>,
    pub job_context: String,
}

/// POST /api/v1/evaluations
/// Multipart form with a `resume` PDF file and a `job_description` text field.
pub async fn handle_evaluate_upload(
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<EvaluationReport>, AppError> {
    let mut resume: Option<Bytes> = None;
    let mut job_description: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Malformed multipart body: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "resume" => {
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::Validation(format!("Could not read resume: {e}")))?;
                resume = Some(data);
            }
            "job_description" => {
                let text = field.text().await.map_err(|e| {
                    AppError::Validation(format!("Could not read job_description: {e}"))
                })?;
                job_description = Some(text);
            }
            _ => {}
        }
    }

    let resume = resume
        .filter(|data| !data.is_empty())
        .ok_or_else(|| AppError::Validation("Missing 'resume' file field".to_string()))?;
    let job_description = job_description
        .ok_or_else(|| AppError::Validation("Missing 'job_description' field".to_string()))?;

    let resume_text = extract_pdf_text(resume).await?;
    let report = evaluate(&state, &resume_text, &job_description).await?;
    Ok(Json(report))
}

/// POST /api/v1/evaluations/text
pub async fn handle_evaluate_text(
    State(state): State<AppState>,
    Json(req): Json<TextEvaluationRequest>,
) -> Result<Json<EvaluationReport>, AppError> {
    let resume_text = collapse_whitespace(&req.resume_text);
    let report = evaluate(&state, &resume_text, &req.job_description).await?;
    Ok(Json(report))
}

/// POST /api/v1/retrieve
/// Runs only the retrieval stage against a job description.
pub async fn handle_retrieve(
    State(state): State<AppState>,
    Json(req): Json<RetrieveRequest>,
) -> Result<Json<RetrieveResponse>, AppError> {
    if req.query.trim().is_empty() {
        return Err(AppError::Validation("query is empty".to_string()));
    }
    let job_description = normalize_job_description(&req.job_description);
    if job_description.is_empty() {
        return Err(AppError::Validation(
            "job_description has no usable text".to_string(),
        ));
    }

    let defaults = state.config.retrieval;
    let retriever = match req.retriever.as_deref() {
        Some(name) => name.parse::<RetrieverKind>()?,
        None => defaults.retriever,
    };
    let settings = RetrievalSettings::new(
        retriever,
        defaults.chunk_size,
        defaults.chunk_overlap,
        req.top_k.unwrap_or(defaults.top_k),
        defaults.fusion.num_query_variants(),
    )?;

    let context = retrieve_job_context(
        &job_description,
        &req.query,
        &settings,
        state.embedder.clone(),
        state.rewriter.clone(),
    )
    .await?;

    Ok(Json(RetrieveResponse {
        retriever: context.retriever,
        degraded: context.degraded,
        chunk_count: context.chunk_count,
        results: context.passages,
        job_context: context.job_context,
    }))
}
