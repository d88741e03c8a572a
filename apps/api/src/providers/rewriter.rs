//! `QueryRewriter` backed by the chat model.

use anyhow::Result;
use async_trait::async_trait;
use tracing::debug;

use crate::llm_client::LlmClient;
use crate::retrieval::QueryRewriter;

const REWRITE_SYSTEM: &str = "You generate alternative search queries for a retrieval system. \
    Reply with the queries only, one per line, without numbering or commentary.";

fn build_rewrite_prompt(query: &str, count: usize) -> String {
    format!(
        "Generate {count} search queries, one on each line, that look for the same \
         information as the input query.\n\nQuery: {query}\n\nQueries:"
    )
}

pub struct LlmQueryRewriter {
    llm: LlmClient,
}

impl LlmQueryRewriter {
    pub fn new(llm: LlmClient) -> Self {
        Self { llm }
    }
}

#[async_trait]
impl QueryRewriter for LlmQueryRewriter {
    fn name(&self) -> &str {
        self.llm.model()
    }

    /// Original query first, then up to `n - 1` generated ones.
    async fn rewrite(&self, query: &str, n: usize) -> Result<Vec<String>> {
        if n <= 1 {
            return Ok(vec![query.to_string()]);
        }

        let reply = self
            .llm
            .call_text(&build_rewrite_prompt(query, n - 1), REWRITE_SYSTEM)
            .await?;

        let mut queries = vec![query.to_string()];
        queries.extend(parse_generated_queries(&reply));
        queries.truncate(n);

        debug!(generated = queries.len() - 1, "Rewrote query");
        Ok(queries)
    }
}

/// One query per non-empty line, with list markers and wrapping quotes removed.
pub fn parse_generated_queries(reply: &str) -> Vec<String> {
    reply
        .lines()
        .map(strip_list_marker)
        .map(|line| line.trim_matches(|c: char| c == '"' || c == '\'').trim())
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

fn strip_list_marker(line: &str) -> &str {
    let line = line.trim();
    let line = line.trim_start_matches(['-', '*', '•']).trim_start();

    let digits = line.chars().take_while(char::is_ascii_digit).count();
    if digits > 0 {
        if let Some(rest) = line[digits..].strip_prefix(['.', ')', ':']) {
            return rest.trim_start();
        }
    }
    line
}
