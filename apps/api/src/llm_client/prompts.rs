// Shared prompt fragments. Each service that calls the LLM keeps its own
// prompts.rs alongside it; only cross-cutting pieces live here.

/// System prompt fragment that enforces JSON-only output.
pub const JSON_ONLY_SYSTEM: &str = "You MUST respond with valid JSON only. \
    Do NOT include any text outside the JSON value. \
    Do NOT use markdown code fences. \
    Do NOT include explanations or apologies.";

/// Recruiter persona shared by the evaluation prompts.
pub const RECRUITER_ROLE: &str = "You are an experienced technical recruiter.";

/// Builds a system prompt from a role sentence plus the JSON-only rule.
pub fn json_system(role: &str) -> String {
    format!("{role} {JSON_ONLY_SYSTEM}")
}
