//! SQLite-backed vector store.
//!
//! In-process store using SQLite for records and brute-force cosine
//! similarity for ranking. Embeddings are serialized as little-endian
//! `f32` bytes in a BLOB column; filters run as indexed equality
//! predicates before the linear similarity scan.

use std::path::PathBuf;

use async_trait::async_trait;
use chrono::Utc;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::{Row, SqlitePool};

use super::store::{
    content_id, ChunkMetadata, ChunkRecord, DocumentChunk, SearchOptions, SearchResult, StoreStats,
    VectorStore,
};
use crate::core::errors::RagError;

pub struct SqliteVectorStore {
    pool: SqlitePool,
    dimension: usize,
}

impl SqliteVectorStore {
    pub async fn connect(db_path: PathBuf, dimension: usize) -> Result<Self, RagError> {
        let options = SqliteConnectOptions::new()
            .filename(&db_path)
            .create_if_missing(true)
            .journal_mode(SqliteJournalMode::Wal)
            .synchronous(SqliteSynchronous::Normal)
            .foreign_keys(true);

        let pool = SqlitePoolOptions::new()
            .min_connections(1)
            .max_connections(4)
            .connect_with(options)
            .await
            .map_err(RagError::storage)?;

        let store = Self { pool, dimension };
        store.init_schema().await?;
        Ok(store)
    }

    pub fn dimension(&self) -> usize {
        self.dimension
    }

    async fn init_schema(&self) -> Result<(), RagError> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS documents (
                id TEXT PRIMARY KEY,
                content TEXT NOT NULL,
                embedding BLOB NOT NULL,
                source TEXT NOT NULL,
                framework TEXT NOT NULL,
                type TEXT NOT NULL,
                title TEXT,
                category TEXT,
                file_path TEXT,
                line_number INTEGER,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await
        .map_err(RagError::storage)?;

        for ddl in [
            "CREATE INDEX IF NOT EXISTS idx_documents_framework ON documents(framework)",
            "CREATE INDEX IF NOT EXISTS idx_documents_type ON documents(type)",
            "CREATE INDEX IF NOT EXISTS idx_documents_category ON documents(category)",
            "CREATE INDEX IF NOT EXISTS idx_documents_source ON documents(source)",
        ] {
            sqlx::query(ddl)
                .execute(&self.pool)
                .await
                .map_err(RagError::storage)?;
        }

        Ok(())
    }

    fn serialize_embedding(embedding: &[f32]) -> Vec<u8> {
        embedding.iter().flat_map(|f| f.to_le_bytes()).collect()
    }

    fn deserialize_embedding(bytes: &[u8]) -> Vec<f32> {
        bytes
            .chunks_exact(4)
            .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
            .collect()
    }

    fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() || a.is_empty() {
            return 0.0;
        }

        let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
        let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
        let denom = norm_a * norm_b;

        if denom <= f32::EPSILON {
            0.0
        } else {
            dot / denom
        }
    }

    fn check_dimension(&self, embedding: &[f32]) -> Result<(), RagError> {
        if embedding.len() != self.dimension {
            return Err(RagError::InvalidInput(format!(
                "embedding has {} dimensions, store expects {}",
                embedding.len(),
                self.dimension
            )));
        }
        Ok(())
    }

    fn row_to_chunk(row: &sqlx::sqlite::SqliteRow, embedding: Vec<f32>) -> DocumentChunk {
        DocumentChunk {
            id: row.get("id"),
            content: row.get("content"),
            embedding,
            metadata: ChunkMetadata {
                source: row.get("source"),
                framework: row.get("framework"),
                doc_type: row.get("type"),
                title: row.get("title"),
                category: row.get("category"),
                file_path: row.get("file_path"),
                line_number: row.get("line_number"),
            },
            created_at: row.get("created_at"),
        }
    }

    async fn insert_record<'e, E>(executor: E, chunk: &ChunkRecord) -> Result<String, RagError>
    where
        E: sqlx::Executor<'e, Database = sqlx::Sqlite>,
    {
        let id = content_id(&chunk.content);
        let blob = Self::serialize_embedding(&chunk.embedding);

        sqlx::query(
            "INSERT OR REPLACE INTO documents
             (id, content, embedding, source, framework, type, title, category, file_path, line_number, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)",
        )
        .bind(&id)
        .bind(&chunk.content)
        .bind(&blob)
        .bind(&chunk.metadata.source)
        .bind(&chunk.metadata.framework)
        .bind(&chunk.metadata.doc_type)
        .bind(&chunk.metadata.title)
        .bind(&chunk.metadata.category)
        .bind(&chunk.metadata.file_path)
        .bind(chunk.metadata.line_number)
        .bind(Utc::now())
        .execute(executor)
        .await
        .map_err(RagError::storage)?;

        Ok(id)
    }

    async fn group_counts(&self, sql: &str) -> Result<std::collections::HashMap<String, u64>, RagError> {
        let rows = sqlx::query(sql)
            .fetch_all(&self.pool)
            .await
            .map_err(RagError::storage)?;

        Ok(rows
            .iter()
            .map(|row| {
                let tag: String = row.get(0);
                let count: i64 = row.get(1);
                (tag, count as u64)
            })
            .collect())
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    async fn add_document(&self, chunk: ChunkRecord) -> Result<String, RagError> {
        self.check_dimension(&chunk.embedding)?;
        Self::insert_record(&self.pool, &chunk).await
    }

    async fn add_documents(&self, chunks: Vec<ChunkRecord>) -> Result<Vec<String>, RagError> {
        if chunks.is_empty() {
            return Ok(Vec::new());
        }
        for chunk in &chunks {
            self.check_dimension(&chunk.embedding)?;
        }

        let mut tx = self.pool.begin().await.map_err(RagError::storage)?;
        let mut ids = Vec::with_capacity(chunks.len());
        for chunk in &chunks {
            ids.push(Self::insert_record(&mut *tx, chunk).await?);
        }
        tx.commit().await.map_err(RagError::storage)?;

        Ok(ids)
    }

    async fn search(
        &self,
        query_embedding: &[f32],
        options: &SearchOptions,
    ) -> Result<Vec<SearchResult>, RagError> {
        self.check_dimension(query_embedding)?;

        let mut sql = String::from(
            "SELECT id, content, embedding, source, framework, type, title, category, \
             file_path, line_number, created_at FROM documents WHERE 1=1",
        );
        let mut binds: Vec<&str> = Vec::new();
        if let Some(framework) = options.framework.as_deref() {
            sql.push_str(" AND framework = ?");
            binds.push(framework);
        }
        if let Some(doc_type) = options.doc_type.as_deref() {
            sql.push_str(" AND type = ?");
            binds.push(doc_type);
        }
        if let Some(category) = options.category.as_deref() {
            sql.push_str(" AND category = ?");
            binds.push(category);
        }

        let mut query = sqlx::query(&sql);
        for bind in binds {
            query = query.bind(bind);
        }
        let rows = query
            .fetch_all(&self.pool)
            .await
            .map_err(RagError::storage)?;

        let mut results: Vec<SearchResult> = Vec::new();
        for row in &rows {
            let blob: Vec<u8> = row.get("embedding");
            let stored = Self::deserialize_embedding(&blob);
            if stored.len() != query_embedding.len() {
                let id: String = row.get("id");
                tracing::warn!(
                    "skipping chunk {}: stored embedding has {} dimensions, expected {}",
                    id,
                    stored.len(),
                    query_embedding.len()
                );
                continue;
            }

            let score = Self::cosine_similarity(query_embedding, &stored);
            if score < options.min_score {
                continue;
            }
            results.push(SearchResult {
                chunk: Self::row_to_chunk(row, stored),
                score,
            });
        }

        // Stable sort keeps scan order as the tie-breaker.
        results.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        results.truncate(options.top_k);

        Ok(results)
    }

    async fn stats(&self) -> Result<StoreStats, RagError> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(RagError::storage)?;

        Ok(StoreStats {
            total_documents: total as u64,
            frameworks: self
                .group_counts("SELECT framework, COUNT(*) FROM documents GROUP BY framework")
                .await?,
            types: self
                .group_counts("SELECT type, COUNT(*) FROM documents GROUP BY type")
                .await?,
            categories: self
                .group_counts(
                    "SELECT category, COUNT(*) FROM documents \
                     WHERE category IS NOT NULL GROUP BY category",
                )
                .await?,
            sources: self
                .group_counts("SELECT source, COUNT(*) FROM documents GROUP BY source")
                .await?,
        })
    }

    async fn delete_by_source(&self, source: &str) -> Result<usize, RagError> {
        let result = sqlx::query("DELETE FROM documents WHERE source = ?1")
            .bind(source)
            .execute(&self.pool)
            .await
            .map_err(RagError::storage)?;

        Ok(result.rows_affected() as usize)
    }

    async fn clear(&self) -> Result<(), RagError> {
        sqlx::query("DELETE FROM documents")
            .execute(&self.pool)
            .await
            .map_err(RagError::storage)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn test_store(dimension: usize) -> (SqliteVectorStore, tempfile::TempDir) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteVectorStore::connect(dir.path().join("vector.db"), dimension)
            .await
            .unwrap();
        (store, dir)
    }

    fn record(content: &str, embedding: Vec<f32>, framework: &str, category: Option<&str>) -> ChunkRecord {
        ChunkRecord {
            content: content.to_string(),
            embedding,
            metadata: ChunkMetadata {
                source: "test-docs".to_string(),
                framework: framework.to_string(),
                doc_type: "function".to_string(),
                title: None,
                category: category.map(str::to_string),
                file_path: None,
                line_number: None,
            },
        }
    }

    #[tokio::test]
    async fn insert_and_search_roundtrip() {
        let (store, _dir) = test_store(3).await;

        let id = store
            .add_document(record("Hello world", vec![1.0, 0.0, 0.0], "fivem", None))
            .await
            .unwrap();
        assert_eq!(id, content_id("Hello world"));

        let results = store
            .search(&[1.0, 0.0, 0.0], &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.id, id);
        assert!(results[0].score > 0.99);
        assert_eq!(results[0].chunk.embedding, vec![1.0, 0.0, 0.0]);
    }

    #[tokio::test]
    async fn identical_content_overwrites_instead_of_duplicating() {
        let (store, _dir) = test_store(3).await;

        store
            .add_document(record("same text", vec![1.0, 0.0, 0.0], "fivem", None))
            .await
            .unwrap();
        store
            .add_document(record("same text", vec![0.0, 1.0, 0.0], "qbcore", None))
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_documents, 1);
        assert_eq!(stats.frameworks.get("qbcore"), Some(&1));
        assert!(stats.frameworks.get("fivem").is_none());
    }

    #[tokio::test]
    async fn batch_insert_is_transactional() {
        let (store, _dir) = test_store(2).await;

        let ids = store
            .add_documents(vec![
                record("alpha chunk", vec![1.0, 0.0], "fivem", None),
                record("beta chunk", vec![0.0, 1.0], "fivem", None),
            ])
            .await
            .unwrap();
        assert_eq!(ids.len(), 2);
        assert_eq!(store.stats().await.unwrap().total_documents, 2);

        // A bad record anywhere in the batch must leave nothing behind.
        let err = store
            .add_documents(vec![
                record("gamma chunk", vec![1.0, 0.0], "fivem", None),
                record("delta chunk", vec![1.0], "fivem", None),
            ])
            .await
            .unwrap_err();
        assert!(matches!(err, RagError::InvalidInput(_)));
        assert_eq!(store.stats().await.unwrap().total_documents, 2);
    }

    #[tokio::test]
    async fn search_respects_filters_and_ranking() {
        let (store, _dir) = test_store(2).await;

        store
            .add_documents(vec![
                record("qbcore player chunk", vec![1.0, 0.0], "qbcore", Some("player")),
                record("esx player chunk", vec![0.9, 0.1], "esx", Some("player")),
                record("fivem native chunk", vec![0.0, 1.0], "fivem", None),
            ])
            .await
            .unwrap();

        let options = SearchOptions {
            framework: Some("qbcore".to_string()),
            ..Default::default()
        };
        let results = store.search(&[1.0, 0.0], &options).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.metadata.framework, "qbcore");

        let all = store
            .search(&[1.0, 0.0], &SearchOptions::default())
            .await
            .unwrap();
        for pair in all.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn min_score_and_top_k_bound_results() {
        let (store, _dir) = test_store(2).await;

        store
            .add_documents(vec![
                record("close match", vec![1.0, 0.0], "fivem", None),
                record("far match", vec![-1.0, 0.0], "fivem", None),
            ])
            .await
            .unwrap();

        let strict = SearchOptions {
            min_score: 0.5,
            ..Default::default()
        };
        let results = store.search(&[1.0, 0.0], &strict).await.unwrap();
        assert_eq!(results.len(), 1);
        assert!(results[0].score >= 0.5);

        let capped = SearchOptions {
            top_k: 1,
            min_score: -1.0,
            ..Default::default()
        };
        let results = store.search(&[1.0, 0.0], &capped).await.unwrap();
        assert_eq!(results.len(), 1);
    }

    #[tokio::test]
    async fn zero_norm_embedding_scores_zero() {
        let (store, _dir) = test_store(2).await;

        store
            .add_document(record("zero vector chunk", vec![0.0, 0.0], "fivem", None))
            .await
            .unwrap();

        let results = store
            .search(&[1.0, 0.0], &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 0.0);
    }

    #[tokio::test]
    async fn mismatched_stored_dimension_is_skipped() {
        let (store, _dir) = test_store(2).await;

        store
            .add_document(record("good chunk", vec![1.0, 0.0], "fivem", None))
            .await
            .unwrap();

        // Simulate a record written before a provider/dimension change.
        let stale = SqliteVectorStore::serialize_embedding(&[1.0, 0.0, 0.0]);
        sqlx::query(
            "INSERT INTO documents (id, content, embedding, source, framework, type, created_at)
             VALUES ('stale', 'stale chunk', ?1, 'test-docs', 'fivem', 'function', ?2)",
        )
        .bind(&stale)
        .bind(Utc::now())
        .execute(&store.pool)
        .await
        .unwrap();

        let results = store
            .search(&[1.0, 0.0], &SearchOptions::default())
            .await
            .unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk.content, "good chunk");
    }

    #[tokio::test]
    async fn stats_exclude_null_categories() {
        let (store, _dir) = test_store(2).await;

        store
            .add_documents(vec![
                record("categorized chunk", vec![1.0, 0.0], "qbcore", Some("player")),
                record("uncategorized chunk", vec![0.0, 1.0], "fivem", None),
            ])
            .await
            .unwrap();

        let stats = store.stats().await.unwrap();
        assert_eq!(stats.total_documents, 2);
        assert_eq!(stats.categories.len(), 1);
        assert_eq!(stats.categories.get("player"), Some(&1));
        assert_eq!(stats.frameworks.get("qbcore"), Some(&1));
        assert_eq!(stats.frameworks.get("fivem"), Some(&1));
    }

    #[tokio::test]
    async fn delete_by_source_and_clear() {
        let (store, _dir) = test_store(2).await;

        let mut other = record("other source chunk", vec![1.0, 0.0], "fivem", None);
        other.metadata.source = "other-docs".to_string();
        store
            .add_documents(vec![
                record("first chunk", vec![1.0, 0.0], "fivem", None),
                record("second chunk", vec![0.0, 1.0], "fivem", None),
                other,
            ])
            .await
            .unwrap();

        let removed = store.delete_by_source("test-docs").await.unwrap();
        assert_eq!(removed, 2);
        assert_eq!(store.stats().await.unwrap().total_documents, 1);

        store.clear().await.unwrap();
        assert_eq!(store.stats().await.unwrap().total_documents, 0);
    }

    #[test]
    fn cosine_similarity_bounds() {
        let v = vec![1.0f32, 2.0, 3.0];
        let same = SqliteVectorStore::cosine_similarity(&v, &v);
        assert!((same - 1.0).abs() < 1e-6);

        let opposite = SqliteVectorStore::cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]);
        assert!((opposite + 1.0).abs() < 1e-6);

        let orthogonal = SqliteVectorStore::cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]);
        assert!(orthogonal.abs() < 1e-6);

        let zero = SqliteVectorStore::cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]);
        assert_eq!(zero, 0.0);
    }

    #[test]
    fn embedding_blob_roundtrip() {
        let original = vec![0.25f32, -1.5, 3.75, 0.0];
        let blob = SqliteVectorStore::serialize_embedding(&original);
        assert_eq!(blob.len(), original.len() * 4);
        assert_eq!(SqliteVectorStore::deserialize_embedding(&blob), original);
    }
}
