//! Chunker — splits text into overlapping, token-bounded windows.
//!
//! A token is a maximal run of non-whitespace characters. Chunk `i` starts at
//! token `i * (chunk_size - chunk_overlap)` and holds up to `chunk_size` tokens;
//! only the last chunk may be shorter.

use crate::retrieval::error::RetrievalError;
use crate::retrieval::types::{Chunk, ChunkId};

/// Checks the window parameters shared by the chunker and startup config.
pub fn validate_window(chunk_size: usize, chunk_overlap: usize) -> Result<(), RetrievalError> {
    if chunk_size == 0 {
        return Err(RetrievalError::InvalidConfig(
            "chunk_size must be greater than 0".to_string(),
        ));
    }
    if chunk_overlap >= chunk_size {
        return Err(RetrievalError::InvalidConfig(format!(
            "chunk_overlap ({chunk_overlap}) must be smaller than chunk_size ({chunk_size})"
        )));
    }
    Ok(())
}

/// Splits `text` into ordered chunks of `chunk_size` tokens overlapping by
/// `chunk_overlap` tokens. Empty or whitespace-only input yields no chunks.
pub fn split(
    text: &str,
    chunk_size: usize,
    chunk_overlap: usize,
) -> Result<Vec<Chunk>, RetrievalError> {
    validate_window(chunk_size, chunk_overlap)?;

    let tokens: Vec<&str> = text.split_whitespace().collect();
    if tokens.is_empty() {
        return Ok(Vec::new());
    }

    let stride = chunk_size - chunk_overlap;
    let mut chunks = Vec::with_capacity(tokens.len() / stride + 1);
    let mut start = 0;

    loop {
        let end = (start + chunk_size).min(tokens.len());
        chunks.push(Chunk::new(
            ChunkId::from_ordinal(chunks.len()),
            tokens[start..end].join(" "),
            start,
        ));
        if end == tokens.len() {
            break;
        }
        start += stride;
    }

    Ok(chunks)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn numbered_tokens(n: usize) -> String {
        (0..n).map(|i| format!("t{i}")).collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn test_empty_input_yields_no_chunks() {
        assert!(split("", 10, 2).unwrap().is_empty());
        assert!(split("   \n\t ", 10, 2).unwrap().is_empty());
    }

    #[test]
    fn test_overlap_larger_than_size_is_invalid() {
        let err = split("some text", 50, 60).unwrap_err();
        assert!(matches!(err, RetrievalError::InvalidConfig(_)));
    }

    #[test]
    fn test_overlap_equal_to_size_is_invalid() {
        assert!(matches!(
            split("some text", 10, 10),
            Err(RetrievalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_zero_chunk_size_is_invalid() {
        assert!(matches!(
            split("some text", 0, 0),
            Err(RetrievalError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_invalid_config_is_reported_even_for_empty_input() {
        assert!(split("", 5, 5).is_err());
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunks = split("senior rust engineer", 100, 10).unwrap();
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text(), "senior rust engineer");
        assert_eq!(chunks[0].source_offset(), 0);
    }

    #[test]
    fn test_window_offsets_follow_stride() {
        let text = numbered_tokens(10);
        let chunks = split(&text, 4, 1).unwrap();
        let offsets: Vec<usize> = chunks.iter().map(|c| c.source_offset()).collect();
        assert_eq!(offsets, vec![0, 3, 6]);
        assert_eq!(chunks[0].text(), "t0 t1 t2 t3");
        assert_eq!(chunks[1].text(), "t3 t4 t5 t6");
        assert_eq!(chunks[2].text(), "t6 t7 t8 t9");
    }

    #[test]
    fn test_last_chunk_may_be_shorter() {
        let text = numbered_tokens(7);
        let chunks = split(&text, 4, 1).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[1].text(), "t3 t4 t5 t6");

        let chunks = split(&numbered_tokens(8), 4, 1).unwrap();
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].text(), "t6 t7");
    }

    #[test]
    fn test_chunk_ids_are_sequential() {
        let chunks = split(&numbered_tokens(25), 5, 2).unwrap();
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.id().ordinal(), i);
        }
    }

    #[test]
    fn test_whitespace_is_normalized_inside_chunks() {
        let chunks = split("python\n\n  and\tsql", 10, 0).unwrap();
        assert_eq!(chunks[0].text(), "python and sql");
    }

    /// Dropping each chunk's overlap prefix and concatenating must give back
    /// the original token sequence exactly once.
    #[test]
    fn test_chunks_cover_every_token_exactly_once() {
        for (n, size, overlap) in [(1, 3, 0), (10, 3, 0), (10, 3, 2), (57, 10, 3), (100, 100, 10)] {
            let text = numbered_tokens(n);
            let original: Vec<&str> = text.split_whitespace().collect();
            let chunks = split(&text, size, overlap).unwrap();

            let mut rebuilt: Vec<String> = Vec::new();
            for (i, chunk) in chunks.iter().enumerate() {
                let skip = if i == 0 { 0 } else { overlap };
                rebuilt.extend(chunk.text().split_whitespace().skip(skip).map(String::from));
            }

            assert_eq!(rebuilt, original, "n={n} size={size} overlap={overlap}");
        }
    }
}
