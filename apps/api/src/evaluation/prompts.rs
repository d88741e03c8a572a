// LLM prompt constants for the evaluation pipeline.
// System prompts are built with llm_client::prompts::json_system.

/// Candidate extraction. Replace `{resume_text}` before sending.
pub const CANDIDATE_EXTRACT_PROMPT: &str = r#"Read the resume below and list the candidate's skills, work experience and projects.

Return a JSON object with this EXACT schema (no extra fields):
{
  "skills": ["Rust", "PostgreSQL"],
  "experience": ["Backend Engineer at Acme, 2021-2024: built the billing service"],
  "projects": ["Open-source CLI for log analysis"]
}

Use an empty list when a section is absent. One string per item.

Resume:
{resume_text}"#;

/// Rubric weights. Replace `{job_description}` before sending.
pub const RUBRIC_EXTRACT_PROMPT: &str = r#"Decide how much each category should weigh when scoring candidates for the job below.

Signals to consider:
- skills: how many distinct skills are listed and how many are marked required
- experiences: years of experience asked for, seniority wording, explicit must-haves
- projects: responsibilities that describe building or delivering concrete work

Return a JSON object with this EXACT schema (no extra fields):
{"skills": 0.5, "experiences": 0.3, "projects": 0.2}

Each weight is between 0 and 1 and the three weights sum to 1.

Job Description:
{job_description}"#;

/// Candidate comparison. Replace `{candidate}`, `{rubric}` and `{job_context}`.
pub const COMPARE_PROMPT: &str = r#"Compare the candidate with the job requirements, weighting your judgement by the rubric.

Candidate Info:
{candidate}

Rubric Criteria:
{rubric}

Job Context:
{job_context}

Return a JSON object with this EXACT schema (no extra fields):
{
  "cv_match_score": 0.72,
  "cv_feedback": "Two or three sentences on fit.",
  "project_score": 6.5,
  "project_feedback": "One or two sentences on the projects."
}

cv_match_score is between 0 and 1. project_score is between 0 and 10."#;
