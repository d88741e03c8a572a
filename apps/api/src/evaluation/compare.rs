//! Candidate vs. job comparison.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::candidate::CandidateInfo;
use crate::evaluation::prompts::COMPARE_PROMPT;
use crate::evaluation::rubrics::Rubrics;
use crate::llm_client::prompts::{json_system, RECRUITER_ROLE};
use crate::llm_client::LlmClient;

const MAX_MATCH_SCORE: f64 = 1.0;
const MAX_PROJECT_SCORE: f64 = 10.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompareResult {
    /// 0 to 1
    pub cv_match_score: f64,
    pub cv_feedback: String,
    /// 0 to 10
    pub project_score: f64,
    pub project_feedback: String,
}

impl CompareResult {
    /// Forces both scores into their documented ranges. Non-finite scores become 0.
    pub fn clamped(self) -> Self {
        let clamp = |score: f64, max: f64| {
            if score.is_finite() {
                score.clamp(0.0, max)
            } else {
                0.0
            }
        };
        Self {
            cv_match_score: clamp(self.cv_match_score, MAX_MATCH_SCORE),
            project_score: clamp(self.project_score, MAX_PROJECT_SCORE),
            ..self
        }
    }
}

pub fn build_compare_prompt(
    candidate: &CandidateInfo,
    rubrics: &Rubrics,
    job_context: &str,
) -> String {
    let rubric = serde_json::to_string_pretty(rubrics).unwrap_or_default();
    COMPARE_PROMPT
        .replace("{candidate}", &candidate.summary())
        .replace("{rubric}", &rubric)
        .replace("{job_context}", job_context)
}

pub async fn compare_candidate(
    llm: &LlmClient,
    candidate: &CandidateInfo,
    rubrics: &Rubrics,
    job_context: &str,
) -> Result<CompareResult, AppError> {
    let prompt = build_compare_prompt(candidate, rubrics, job_context);
    let result: CompareResult = llm
        .call_json(&prompt, &json_system(RECRUITER_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Failed to compare candidate: {e}")))?;
    Ok(result.clamped())
}
