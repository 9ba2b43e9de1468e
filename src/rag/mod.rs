//! Retrieval-augmented generation core.
//!
//! This module provides:
//! - `chunker`: deterministic word-window document splitting
//! - `VectorStore` / `SqliteVectorStore`: durable vector storage with
//!   filtered cosine-similarity search
//! - `RagPipeline`: ingestion and search orchestration plus context
//!   prompt formatting

pub mod chunker;
pub mod pipeline;
pub mod sqlite;
pub mod store;

pub use pipeline::{DocumentInput, IngestOptions, IngestSummary, RagContext, RagPipeline};
pub use sqlite::SqliteVectorStore;
pub use store::{
    ChunkMetadata, ChunkRecord, DocumentChunk, SearchOptions, SearchResult, StoreStats, VectorStore,
};
