//! Candidate extraction from resume text.

use serde::{Deserialize, Deserializer, Serialize};

use crate::errors::AppError;
use crate::evaluation::prompts::CANDIDATE_EXTRACT_PROMPT;
use crate::llm_client::prompts::{json_system, RECRUITER_ROLE};
use crate::llm_client::LlmClient;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CandidateInfo {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub skills: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub experience: Vec<String>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub projects: Vec<String>,
}

/// Models sometimes answer `null` for an empty section.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl CandidateInfo {
    /// Plain-text rendering fed to the comparison prompt.
    pub fn summary(&self) -> String {
        format!(
            "Skills: {}\n\nExperience:\n{}\n\nProjects:\n{}\n",
            self.skills.join(", "),
            self.experience.join("\n"),
            self.projects.join("\n")
        )
    }
}

pub async fn extract_candidate(
    llm: &LlmClient,
    resume_text: &str,
) -> Result<CandidateInfo, AppError> {
    let prompt = CANDIDATE_EXTRACT_PROMPT.replace("{resume_text}", resume_text);
    llm.call_json(&prompt, &json_system(RECRUITER_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Failed to extract candidate info: {e}")))
}
