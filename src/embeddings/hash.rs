//! Offline embedding provider.
//!
//! Hashes each token of the input into a bucket and accumulates a weight,
//! then L2-normalizes. Texts sharing tokens get strictly positive cosine
//! similarity, which is enough signal for local development and tests
//! without any model or network dependency.

use async_trait::async_trait;
use std::hash::{Hash, Hasher};
use twox_hash::XxHash64;

use super::provider::EmbeddingProvider;
use crate::core::errors::RagError;

pub struct HashEmbeddingProvider {
    dimension: usize,
}

impl HashEmbeddingProvider {
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn bag_of_tokens(&self, text: &str) -> Vec<f32> {
        let mut values = vec![0f32; self.dimension];
        if self.dimension == 0 {
            return values;
        }

        let normalized: String = text
            .chars()
            .map(|c| {
                if c.is_alphanumeric() {
                    c.to_ascii_lowercase()
                } else {
                    ' '
                }
            })
            .collect();

        for token in normalized.split_whitespace() {
            let mut hasher = XxHash64::with_seed(0);
            token.hash(&mut hasher);
            let raw = hasher.finish();
            let bucket = (raw as usize) % self.dimension;
            let weight = ((raw >> 32) as u32) as f32 / u32::MAX as f32;
            values[bucket] += weight + 0.01;
        }

        let norm = values.iter().map(|v| v * v).sum::<f32>().sqrt();
        if norm > f32::EPSILON {
            for value in &mut values {
                *value /= norm;
            }
        }
        values
    }
}

#[async_trait]
impl EmbeddingProvider for HashEmbeddingProvider {
    fn name(&self) -> &str {
        "hash"
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError> {
        Ok(texts.iter().map(|text| self.bag_of_tokens(text)).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn batch_preserves_order_and_length() {
        let provider = HashEmbeddingProvider::new(128);
        let texts = vec!["first text".to_string(), "second text".to_string()];
        let vectors = provider.embed_batch(&texts).await.unwrap();

        assert_eq!(vectors.len(), 2);
        assert!(vectors.iter().all(|v| v.len() == 128));
        assert_eq!(vectors[0], provider.embed("first text").await.unwrap());
    }

    #[tokio::test]
    async fn shared_tokens_score_positive() {
        let provider = HashEmbeddingProvider::new(256);
        let a = provider.embed("Wait pauses script execution").await.unwrap();
        let b = provider.embed("how do I wait in a loop").await.unwrap();

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        assert!(dot > 0.0, "texts sharing 'wait' should overlap");
    }

    #[tokio::test]
    async fn empty_text_embeds_to_zero_vector() {
        let provider = HashEmbeddingProvider::new(64);
        let v = provider.embed("").await.unwrap();
        assert!(v.iter().all(|x| *x == 0.0));
    }
}
