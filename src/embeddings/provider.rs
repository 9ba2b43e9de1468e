use async_trait::async_trait;

use crate::core::errors::RagError;

/// Maps text to fixed-dimension vectors.
///
/// `embed_batch` is order-preserving and returns one vector per input.
/// The trait is fallible so tests can inject provider failures; the
/// shipped providers never return an error from `embed_batch`, because
/// remote failures are absorbed into a deterministic fallback vector.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// provider name (e.g. "openai", "hash")
    fn name(&self) -> &str;

    /// dimensionality of every vector this provider produces
    fn dimension(&self) -> usize;

    /// embed a batch of texts, one vector per input, input order preserved
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RagError>;

    /// embed a single text
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RagError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RagError::Embedding("no embedding returned".to_string()))
    }
}
