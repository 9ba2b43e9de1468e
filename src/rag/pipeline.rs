//! RAG orchestrator.
//!
//! Composes the chunker, an embedding provider and a vector store into
//! the two public operations (document ingestion and similarity search)
//! plus a context-prompt formatter for downstream consumers. The store
//! and provider are injected at construction; the pipeline holds no
//! global state.

use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::chunker::chunk_words;
use super::store::{ChunkRecord, SearchOptions, SearchResult, StoreStats, VectorStore};
use crate::core::errors::RagError;
use crate::embeddings::EmbeddingProvider;

/// Chunks shorter than this are discarded as noise before embedding.
const MIN_CHUNK_CHARS: usize = 50;

/// A document handed to ingestion, before chunking.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DocumentInput {
    pub content: String,
    pub metadata: super::store::ChunkMetadata,
}

/// Options for document ingestion.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct IngestOptions {
    /// Chunk size in words.
    pub chunk_size: usize,
    /// Overlap between consecutive chunks, in words.
    pub chunk_overlap: usize,
    /// Documents processed per embed-and-store transaction.
    pub batch_size: usize,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            chunk_overlap: 200,
            batch_size: 10,
        }
    }
}

/// Structured ingestion outcome. Batch failures are counted, not thrown.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestSummary {
    pub processed_documents: usize,
    pub total_chunks: usize,
    pub failed_documents: usize,
}

/// Result of a search call, with wall-clock latency for observability.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RagContext {
    pub query: String,
    pub results: Vec<SearchResult>,
    pub total_results: usize,
    pub search_time_ms: u64,
}

pub struct RagPipeline {
    store: Arc<dyn VectorStore>,
    provider: Arc<dyn EmbeddingProvider>,
}

impl RagPipeline {
    pub fn new(store: Arc<dyn VectorStore>, provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self { store, provider }
    }

    /// Chunk, embed and store a set of documents.
    ///
    /// Documents are processed in batches of `batch_size`; each batch is
    /// embedded with a single provider call and written in a single store
    /// transaction. A failing batch marks its documents failed and
    /// processing continues with the next batch. Input validation happens
    /// before any side effect.
    pub async fn ingest_documents(
        &self,
        documents: &[DocumentInput],
        options: &IngestOptions,
    ) -> Result<IngestSummary, RagError> {
        validate_ingest_options(options)?;
        for (index, doc) in documents.iter().enumerate() {
            validate_document(index, doc)?;
        }

        let mut summary = IngestSummary::default();

        for batch in documents.chunks(options.batch_size) {
            match self.process_batch(batch, options).await {
                Ok(chunk_count) => {
                    summary.processed_documents += batch.len();
                    summary.total_chunks += chunk_count;
                }
                Err(err) => {
                    tracing::warn!("failed to process document batch: {}", err);
                    summary.failed_documents += batch.len();
                }
            }
        }

        Ok(summary)
    }

    async fn process_batch(
        &self,
        batch: &[DocumentInput],
        options: &IngestOptions,
    ) -> Result<usize, RagError> {
        let mut texts: Vec<String> = Vec::new();
        let mut metadatas: Vec<super::store::ChunkMetadata> = Vec::new();

        for doc in batch {
            let chunks = chunk_words(&doc.content, options.chunk_size, options.chunk_overlap)?;
            for (index, chunk) in chunks.into_iter().enumerate() {
                if chunk.len() < MIN_CHUNK_CHARS {
                    continue;
                }
                let mut metadata = doc.metadata.clone();
                // Offset the line hint so later chunks point further into
                // the source file.
                metadata.line_number = metadata.line_number.map(|line| line + (index as i64) * 10);
                texts.push(chunk);
                metadatas.push(metadata);
            }
        }

        if texts.is_empty() {
            return Ok(0);
        }

        let embeddings = self.provider.embed_batch(&texts).await?;
        if embeddings.len() != texts.len() {
            return Err(RagError::Embedding(format!(
                "provider returned {} embeddings for {} chunks",
                embeddings.len(),
                texts.len()
            )));
        }

        let records: Vec<ChunkRecord> = texts
            .into_iter()
            .zip(metadatas)
            .zip(embeddings)
            .map(|((content, metadata), embedding)| ChunkRecord {
                content,
                embedding,
                metadata,
            })
            .collect();

        let count = records.len();
        self.store.add_documents(records).await?;
        Ok(count)
    }

    /// Embed the query and rank stored chunks against it.
    pub async fn search(
        &self,
        query: &str,
        options: &SearchOptions,
    ) -> Result<RagContext, RagError> {
        let trimmed = query.trim();
        if trimmed.is_empty() {
            return Err(RagError::InvalidInput("query must not be empty".to_string()));
        }
        if trimmed.chars().count() > 500 {
            return Err(RagError::InvalidInput(
                "query must be at most 500 characters".to_string(),
            ));
        }
        if options.top_k == 0 || options.top_k > 20 {
            return Err(RagError::InvalidInput(format!(
                "top_k must be between 1 and 20, got {}",
                options.top_k
            )));
        }

        // "all" is the wildcard framework tag at the application boundary.
        let mut store_options = options.clone();
        if store_options.framework.as_deref() == Some("all") {
            store_options.framework = None;
        }

        let started = Instant::now();
        let query_embedding = self.provider.embed(trimmed).await?;
        let results = self.store.search(&query_embedding, &store_options).await?;
        let search_time_ms = started.elapsed().as_millis() as u64;

        Ok(RagContext {
            query: trimmed.to_string(),
            total_results: results.len(),
            results,
            search_time_ms,
        })
    }

    /// Format ranked results into a prompt block for the chat model.
    ///
    /// Pure formatting: no I/O, no randomness.
    pub fn generate_context_prompt(
        &self,
        context: &RagContext,
        user_query: &str,
        active_file: Option<&str>,
    ) -> String {
        let file_line = active_file
            .map(|file| format!("\nActive File: {}", file))
            .unwrap_or_default();

        if context.results.is_empty() {
            return format!(
                "User Query: {}{}\n\nNo relevant documentation found. \
                 Please provide general FiveM Lua development assistance.",
                user_query, file_line
            );
        }

        let chunks = context
            .results
            .iter()
            .enumerate()
            .map(|(index, result)| {
                let label = result
                    .chunk
                    .metadata
                    .title
                    .as_deref()
                    .unwrap_or(&result.chunk.metadata.doc_type);
                format!(
                    "[{}] {} ({}):\n{}",
                    index + 1,
                    label,
                    result.chunk.metadata.framework,
                    result.chunk.content
                )
            })
            .collect::<Vec<_>>()
            .join("\n\n");

        format!(
            "User Query: {}{}\n\nRelevant Documentation:\n{}\n\n\
             Please provide a helpful response based on the above context \
             and your knowledge of FiveM Lua development.",
            user_query, file_line, chunks
        )
    }

    pub async fn stats(&self) -> Result<StoreStats, RagError> {
        self.store.stats().await
    }

    pub async fn delete_by_source(&self, source: &str) -> Result<usize, RagError> {
        if source.trim().is_empty() {
            return Err(RagError::InvalidInput("source must not be empty".to_string()));
        }
        self.store.delete_by_source(source).await
    }

    pub async fn clear(&self) -> Result<(), RagError> {
        self.store.clear().await
    }
}

fn validate_ingest_options(options: &IngestOptions) -> Result<(), RagError> {
    if !(100..=2000).contains(&options.chunk_size) {
        return Err(RagError::InvalidInput(format!(
            "chunk_size must be between 100 and 2000, got {}",
            options.chunk_size
        )));
    }
    if options.chunk_overlap > 500 {
        return Err(RagError::InvalidInput(format!(
            "chunk_overlap must be at most 500, got {}",
            options.chunk_overlap
        )));
    }
    if options.chunk_overlap >= options.chunk_size {
        return Err(RagError::InvalidInput(format!(
            "chunk_overlap ({}) must be smaller than chunk_size ({})",
            options.chunk_overlap, options.chunk_size
        )));
    }
    if options.batch_size == 0 {
        return Err(RagError::InvalidInput(
            "batch_size must be at least 1".to_string(),
        ));
    }
    Ok(())
}

fn validate_document(index: usize, doc: &DocumentInput) -> Result<(), RagError> {
    if doc.content.trim().is_empty() {
        return Err(RagError::InvalidInput(format!(
            "document {} has empty content",
            index
        )));
    }
    for (field, value) in [
        ("source", &doc.metadata.source),
        ("framework", &doc.metadata.framework),
        ("type", &doc.metadata.doc_type),
    ] {
        if value.trim().is_empty() {
            return Err(RagError::InvalidInput(format!(
                "document {} has empty metadata field '{}'",
                index, field
            )));
        }
    }
    Ok(())
}
