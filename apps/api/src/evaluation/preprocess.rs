//! Text preparation ahead of extraction and chunking.

use bytes::Bytes;

use crate::errors::AppError;

/// Lower-cased ASCII letters, digits and single spaces only.
///
/// Whitespace of any kind becomes a space before filtering, so words on
/// separate lines stay separate.
pub fn normalize_job_description(text: &str) -> String {
    let filtered: String = text
        .chars()
        .map(|c| if c.is_whitespace() { ' ' } else { c })
        .filter(|c| c.is_ascii_alphanumeric() || *c == ' ')
        .map(|c| c.to_ascii_lowercase())
        .collect();
    collapse_whitespace(&filtered)
}

/// Collapses runs of spaces and tabs and trims each line; blank lines are kept
/// at most one in a row.
pub fn collapse_whitespace(text: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    for line in text.lines() {
        let line = line.split_whitespace().collect::<Vec<_>>().join(" ");
        if line.is_empty() && lines.last().map_or(true, |l| l.is_empty()) {
            continue;
        }
        lines.push(line);
    }
    while lines.last().is_some_and(|l| l.is_empty()) {
        lines.pop();
    }
    lines.join("\n")
}

/// Extracts text from an uploaded PDF off the async executor.
pub async fn extract_pdf_text(pdf: Bytes) -> Result<String, AppError> {
    let text = tokio::task::spawn_blocking(move || pdf_extract::extract_text_from_mem(&pdf))
        .await
        .map_err(|e| {
            // The parser panics on some malformed files.
            if e.is_panic() {
                AppError::UnprocessableEntity("Could not read the PDF".to_string())
            } else {
                AppError::Internal(anyhow::anyhow!("spawn_blocking failed in PDF extraction: {e}"))
            }
        })?
        .map_err(|e| AppError::UnprocessableEntity(format!("Could not read the PDF: {e}")))?;
    Ok(collapse_whitespace(&text))
}
