//! `Embedder` over an OpenAI-compatible `/embeddings` endpoint.
//!
//! Works with Mistral, OpenAI and most self-hosted gateways. A whole chunk set
//! is sent as one batch request.

use std::time::Duration;

use anyhow::{bail, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::retrieval::Embedder;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

pub struct HttpEmbedder {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl HttpEmbedder {
    pub fn new(base_url: &str, api_key: String, model: String, timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .context("Failed to build embedding HTTP client")?;
        Ok(Self {
            client,
            endpoint: format!("{}/embeddings", base_url.trim_end_matches('/')),
            api_key,
            model,
        })
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    fn name(&self) -> &str {
        &self.model
    }

    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors.pop().context("Embedding provider returned no vector")
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&EmbeddingRequest {
                model: &self.model,
                input: texts,
            })
            .send()
            .await
            .with_context(|| format!("Embedding request to {} failed", self.endpoint))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            bail!("Embedding API returned {status}: {body}");
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .context("Embedding API returned malformed JSON")?;

        debug!(model = %self.model, inputs = texts.len(), "Embedded batch");
        order_embeddings(parsed.data, texts.len())
    }
}

/// Places each vector at its `index`, requiring exactly one per input.
fn order_embeddings(data: Vec<EmbeddingData>, expected: usize) -> Result<Vec<Vec<f32>>> {
    if data.len() != expected {
        bail!(
            "Embedding API returned {} vectors for {} inputs",
            data.len(),
            expected
        );
    }

    let mut slots: Vec<Option<Vec<f32>>> = vec![None; expected];
    for item in data {
        let slot = slots
            .get_mut(item.index)
            .with_context(|| format!("Embedding index {} out of range", item.index))?;
        if slot.replace(item.embedding).is_some() {
            bail!("Embedding index {} returned twice", item.index);
        }
    }

    // Every slot is filled: lengths match and no index repeated.
    Ok(slots.into_iter().flatten().collect())
}
