//! Runtime settings for the retrieval core.
//!
//! Everything is overridable through `COPILOT_*` environment variables so
//! the same binary works in development, tests, and an embedded deployment.

use std::env;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Settings for the embedding provider.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingSettings {
    /// Base URL of an OpenAI-compatible embeddings endpoint. When absent
    /// the offline hash provider is used instead.
    pub base_url: Option<String>,
    /// Model identifier sent with each embeddings request.
    pub model: String,
    /// Dimensionality of the vectors the provider produces.
    pub dimension: usize,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for EmbeddingSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            model: "text-embedding-3-small".to_string(),
            dimension: 1536,
            timeout_secs: 30,
        }
    }
}

/// Settings for the RAG subsystem.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RagSettings {
    /// Directory holding the vector database and log files.
    pub data_dir: PathBuf,
    pub embedding: EmbeddingSettings,
    /// Default chunk size in words.
    pub chunk_size: usize,
    /// Default overlap between consecutive chunks, in words.
    pub chunk_overlap: usize,
    /// Number of documents ingested per transaction.
    pub batch_size: usize,
}

impl Default for RagSettings {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            embedding: EmbeddingSettings::default(),
            chunk_size: 1000,
            chunk_overlap: 200,
            batch_size: 10,
        }
    }
}

impl RagSettings {
    /// Build settings from the environment, falling back to defaults.
    pub fn from_env() -> Self {
        let mut settings = Self::default();

        if let Ok(dir) = env::var("COPILOT_DATA_DIR") {
            settings.data_dir = PathBuf::from(dir);
        }
        if let Ok(url) = env::var("COPILOT_EMBEDDINGS_URL") {
            let trimmed = url.trim();
            if !trimmed.is_empty() {
                settings.embedding.base_url = Some(trimmed.to_string());
            }
        }
        if let Ok(model) = env::var("COPILOT_EMBEDDINGS_MODEL") {
            settings.embedding.model = model;
        }
        if let Ok(dim) = env::var("COPILOT_EMBEDDING_DIM") {
            if let Ok(parsed) = dim.parse::<usize>() {
                settings.embedding.dimension = parsed;
            }
        }

        let _ = fs::create_dir_all(&settings.data_dir);
        settings
    }

    pub fn db_path(&self) -> PathBuf {
        self.data_dir.join("vector.db")
    }

    pub fn log_dir(&self) -> PathBuf {
        self.data_dir.join("logs")
    }
}
