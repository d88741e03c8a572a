//! Rubric weights derived from the job description.
//!
//! The model is asked for weights that already sum to 1, but its arithmetic
//! is not trusted: `Rubrics::normalized` redoes the normalization and the
//! one-decimal rounding in code.

use serde::{Deserialize, Serialize};

use crate::errors::AppError;
use crate::evaluation::prompts::RUBRIC_EXTRACT_PROMPT;
use crate::llm_client::prompts::{json_system, RECRUITER_ROLE};
use crate::llm_client::LlmClient;

/// Rounding unit count: weights are multiples of 0.1.
const TENTHS: u32 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Rubrics {
    pub skills: f64,
    pub experiences: f64,
    pub projects: f64,
}

impl Rubrics {
    /// Weights in [0, 1], rounded to one decimal, summing to exactly 1.0.
    ///
    /// Negative or non-finite weights count as 0. An all-zero rubric falls
    /// back to equal weights.
    pub fn normalized(&self) -> Rubrics {
        let clean = |w: f64| if w.is_finite() && w > 0.0 { w } else { 0.0 };
        let mut weights = [clean(self.skills), clean(self.experiences), clean(self.projects)];
        let mut total: f64 = weights.iter().sum();
        if total == 0.0 {
            weights = [1.0; 3];
            total = 3.0;
        }

        let shares = weights.map(|w| w / total * f64::from(TENTHS));
        let [skills, experiences, projects] = round_to_tenths(shares);
        Rubrics {
            skills,
            experiences,
            projects,
        }
    }
}

/// Largest-remainder rounding of shares that sum to `TENTHS`. Leftover units
/// go to the largest fractional parts, earlier categories first on ties.
fn round_to_tenths(shares: [f64; 3]) -> [f64; 3] {
    let mut units = shares.map(|s| s.floor() as u32);
    let assigned: u32 = units.iter().sum();

    let mut by_remainder: Vec<usize> = (0..shares.len()).collect();
    by_remainder.sort_by(|&a, &b| {
        let ra = shares[a] - shares[a].floor();
        let rb = shares[b] - shares[b].floor();
        rb.total_cmp(&ra).then(a.cmp(&b))
    });

    for &i in by_remainder
        .iter()
        .take(TENTHS.saturating_sub(assigned) as usize)
    {
        units[i] += 1;
    }

    units.map(|u| f64::from(u) / f64::from(TENTHS))
}

pub async fn extract_rubrics(llm: &LlmClient, job_description: &str) -> Result<Rubrics, AppError> {
    let prompt = RUBRIC_EXTRACT_PROMPT.replace("{job_description}", job_description);
    let raw: Rubrics = llm
        .call_json(&prompt, &json_system(RECRUITER_ROLE))
        .await
        .map_err(|e| AppError::Llm(format!("Failed to extract rubrics: {e}")))?;
    Ok(raw.normalized())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rubrics(skills: f64, experiences: f64, projects: f64) -> Rubrics {
        Rubrics {
            skills,
            experiences,
            projects,
        }
    }

    fn sum(r: &Rubrics) -> f64 {
        r.skills + r.experiences + r.projects
    }

    #[test]
    fn test_already_normalized_is_unchanged() {
        assert_eq!(rubrics(0.5, 0.3, 0.2).normalized(), rubrics(0.5, 0.3, 0.2));
    }

    #[test]
    fn test_raw_weights_are_scaled() {
        assert_eq!(rubrics(2.0, 1.0, 1.0).normalized(), rubrics(0.5, 0.3, 0.2));
    }

    #[test]
    fn test_all_zero_falls_back_to_equal_weights() {
        assert_eq!(rubrics(0.0, 0.0, 0.0).normalized(), rubrics(0.4, 0.3, 0.3));
    }

    #[test]
    fn test_negative_and_nan_count_as_zero() {
        assert_eq!(rubrics(-1.0, f64::NAN, 2.0).normalized(), rubrics(0.0, 0.0, 1.0));
    }

    #[test]
    fn test_model_rounding_errors_are_fixed() {
        // A model answer that sums to 1.1.
        let normalized = rubrics(0.4, 0.4, 0.3).normalized();
        assert!((sum(&normalized) - 1.0).abs() < 1e-9, "{normalized:?}");
        for w in [normalized.skills, normalized.experiences, normalized.projects] {
            assert!((w * 10.0 - (w * 10.0).round()).abs() < 1e-9, "{w} is not a tenth");
        }
    }

    #[test]
    fn test_parses_model_json() {
        let parsed: Rubrics =
            serde_json::from_str(r#"{"skills": 0.6, "experiences": 0.25, "projects": 0.15}"#)
                .unwrap();
        let normalized = parsed.normalized();
        assert!((sum(&normalized) - 1.0).abs() < 1e-9);
    }
}
