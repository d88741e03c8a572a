//! Lexical analysis for the BM25 index: lower-case, split on non-alphanumeric
//! characters, Snowball English (Porter2) stemming.
//!
//! No stop-word list is applied. BM25's IDF term already pushes very common
//! words towards zero weight.

use std::sync::LazyLock;

use rust_stemmers::{Algorithm, Stemmer};

static STEMMER: LazyLock<Stemmer> = LazyLock::new(|| Stemmer::create(Algorithm::English));

/// Returns the stemmed terms of `text` in order of appearance.
pub fn analyze(text: &str) -> Vec<String> {
    let lowered = text.to_lowercase();
    lowered
        .split(|c: char| !c.is_alphanumeric())
        .filter(|token| !token.is_empty())
        .map(|token| STEMMER.stem(token).into_owned())
        .collect()
}
