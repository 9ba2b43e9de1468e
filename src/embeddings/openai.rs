//! OpenAI-compatible embeddings provider.
//!
//! Talks to any endpoint exposing `POST /v1/embeddings`. Request failures
//! are never propagated: the provider logs a warning and substitutes the
//! deterministic fallback vector for each input, so ingestion and search
//! keep functioning during an outage, with degraded relevance.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::fallback::pseudo_embedding;
use super::provider::EmbeddingProvider;
use crate::core::errors::RagError;

pub struct OpenAiEmbeddingProvider {
    base_url: String,
    model: String,
    dimension: usize,
    timeout: Duration,
    client: Client,
}

impl OpenAiEmbeddingProvider {
    pub fn new(base_url: &str, model: &str, dimension: usize, timeout_secs: u64) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            model: model.to_string(),
            dimension,
            timeout: Duration::from_secs(timeout_secs),
            client: Client::new(),
        }
    }

    async fn request_embeddings(&self, inputs: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        let url = format!("{}/v1/embeddings", self.base_url);

        let body = json!({
            "model": self.model,
            "input": inputs,
        });

        let res = self
            .client
            .post(&url)
            .timeout(self.timeout)
            .json(&body)
            .send()
            .await
            .map_err(RagError::embedding)?;

        if !res.status().is_success() {
            let status = res.status();
            let text = res.text().await.unwrap_or_default();
            return Err(RagError::Embedding(format!(
                "embeddings endpoint returned {}: {}",
                status, text
            )));
        }

        let payload: Value = res.json().await.map_err(RagError::embedding)?;

        let mut embeddings = Vec::new();
        if let Some(data) = payload["data"].as_array() {
            for item in data {
                if let Some(vals) = item["embedding"].as_array() {
                    let vec: Vec<f32> = vals
                        .iter()
                        .filter_map(|v| v.as_f64().map(|f| f as f32))
                        .collect();
                    embeddings.push(vec);
                }
            }
        }

        if embeddings.len() != inputs.len() {
            return Err(RagError::Embedding(format!(
                "expected {} embeddings, got {}",
                inputs.len(),
                embeddings.len()
            )));
        }
        if let Some(bad) = embeddings.iter().find(|v| v.len() != self.dimension) {
            return Err(RagError::Embedding(format!(
                "embedding dimension mismatch: expected {}, got {}",
                self.dimension,
                bad.len()
            )));
        }

        Ok(embeddings)
    }
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    fn name(&self) -> &str {
        "openai"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let cleaned: Vec<String> = texts
            .iter()
            .map(|text| text.replace('\n', " ").trim().to_string())
            .collect();

        match self.request_embeddings(&cleaned).await {
            Ok(vectors) => Ok(vectors),
            Err(err) => {
                tracing::warn!(
                    "embedding request failed, using deterministic fallback: {}",
                    err
                );
                Ok(cleaned
                    .iter()
                    .map(|text| pseudo_embedding(text, self.dimension))
                    .collect())
            }
        }
    }
}
