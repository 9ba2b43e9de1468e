//! Retrieval core for the FiveM Copilot assistant.
//!
//! Ingests documentation, splits it into overlapping word-window chunks,
//! embeds each chunk, persists vectors with metadata in SQLite, and
//! answers similarity queries by cosine-ranking the stored chunks. The
//! surrounding application (chat, editor, upload UI) consumes this crate
//! through `RagPipeline`.

pub mod core;
pub mod embeddings;
pub mod knowledge;
pub mod rag;

pub use crate::core::config::{EmbeddingSettings, RagSettings};
pub use crate::core::errors::RagError;
pub use crate::embeddings::{EmbeddingProvider, HashEmbeddingProvider, OpenAiEmbeddingProvider};
pub use crate::rag::{
    ChunkMetadata, DocumentInput, IngestOptions, IngestSummary, RagContext, RagPipeline,
    SearchOptions, SearchResult, SqliteVectorStore, StoreStats, VectorStore,
};
