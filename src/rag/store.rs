//! Data model and storage trait for the vector store.
//!
//! The primary implementation is `SqliteVectorStore` in the `sqlite`
//! module. Chunk ids are derived from content, so re-ingesting identical
//! text overwrites the existing record instead of duplicating it.

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::core::errors::RagError;

/// Classification metadata attached to every stored chunk.
///
/// `source`, `framework` and `doc_type` are required filter axes; the
/// rest are free-form hints. All tags are opaque strings to the store.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkMetadata {
    pub source: String,
    pub framework: String,
    #[serde(rename = "type")]
    pub doc_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line_number: Option<i64>,
}

/// A stored chunk: the atomic retrievable unit.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentChunk {
    /// Content-derived stable identifier.
    pub id: String,
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
    pub created_at: DateTime<Utc>,
}

/// A chunk ready for insertion; id and timestamp are assigned by the store.
#[derive(Debug, Clone)]
pub struct ChunkRecord {
    pub content: String,
    pub embedding: Vec<f32>,
    pub metadata: ChunkMetadata,
}

/// Result of a similarity search. Scores are transient and never persisted.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(flatten)]
    pub chunk: DocumentChunk,
    /// Cosine similarity against the query vector, in [-1, 1].
    pub score: f32,
}

/// Options for a similarity search.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchOptions {
    pub top_k: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub framework: Option<String>,
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub doc_type: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    pub min_score: f32,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            top_k: 6,
            framework: None,
            doc_type: None,
            category: None,
            min_score: 0.0,
        }
    }
}

/// Aggregate statistics over the stored corpus.
///
/// Records without a category count toward `total_documents` but do not
/// appear in `categories`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StoreStats {
    pub total_documents: u64,
    pub frameworks: HashMap<String, u64>,
    pub types: HashMap<String, u64>,
    pub categories: HashMap<String, u64>,
    pub sources: HashMap<String, u64>,
}

/// Stable content-derived chunk id: SHA-256 of the text, first 16 hex chars.
pub fn content_id(content: &str) -> String {
    let digest = Sha256::digest(content.as_bytes());
    hex::encode(digest)[..16].to_string()
}

/// Abstract interface for vector storage backends.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Insert or overwrite a chunk, returning its content-derived id.
    async fn add_document(&self, chunk: ChunkRecord) -> Result<String, RagError>;

    /// Insert a batch of chunks in a single all-or-nothing transaction.
    async fn add_documents(&self, chunks: Vec<ChunkRecord>) -> Result<Vec<String>, RagError>;

    /// Rank stored chunks against the query vector.
    async fn search(
        &self,
        query_embedding: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, RagError>;

    /// Aggregate counts grouped by metadata tags.
    async fn stats(&self) -> Result<StoreStats, RagError>;

    /// Delete every chunk whose source equals `source`; returns the count.
    async fn delete_by_source(&self, source: &str) -> Result<usize, RagError>;

    /// Remove all chunks unconditionally.
    async fn clear(&self) -> Result<(), RagError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn content_id_is_stable_and_short() {
        let a = content_id("GetPlayerPed(playerId) -> Ped");
        let b = content_id("GetPlayerPed(playerId) -> Ped");
        assert_eq!(a, b);
        assert_eq!(a.len(), 16);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn content_id_differs_for_different_content() {
        assert_ne!(content_id("Wait(0)"), content_id("Wait(1000)"));
    }
}
