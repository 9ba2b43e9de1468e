use std::env;
use std::sync::Arc;

use anyhow::Context;

use copilot_rag::core::{config::RagSettings, logging};
use copilot_rag::embeddings::{EmbeddingProvider, HashEmbeddingProvider, OpenAiEmbeddingProvider};
use copilot_rag::knowledge;
use copilot_rag::rag::{RagPipeline, SearchOptions, SqliteVectorStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = RagSettings::from_env();
    logging::init(&settings);

    let provider: Arc<dyn EmbeddingProvider> = match settings.embedding.base_url.as_deref() {
        Some(base_url) => {
            tracing::info!("using embeddings endpoint at {}", base_url);
            Arc::new(OpenAiEmbeddingProvider::new(
                base_url,
                &settings.embedding.model,
                settings.embedding.dimension,
                settings.embedding.timeout_secs,
            ))
        }
        None => {
            tracing::info!("no embeddings endpoint configured, using offline hash provider");
            Arc::new(HashEmbeddingProvider::new(settings.embedding.dimension))
        }
    };

    let store = SqliteVectorStore::connect(settings.db_path(), provider.dimension())
        .await
        .with_context(|| format!("failed to open {}", settings.db_path().display()))?;
    let pipeline = RagPipeline::new(Arc::new(store), provider);

    let summary = knowledge::initialize_knowledge_base(&pipeline)
        .await
        .context("failed to seed knowledge base")?;
    println!(
        "Ingested {} documents ({} chunks, {} failed)",
        summary.processed_documents, summary.total_chunks, summary.failed_documents
    );

    let stats = pipeline.stats().await.context("failed to read stats")?;
    println!("\nKnowledge base statistics:");
    println!("  total documents: {}", stats.total_documents);
    for (label, counts) in [
        ("frameworks", &stats.frameworks),
        ("types", &stats.types),
        ("categories", &stats.categories),
        ("sources", &stats.sources),
    ] {
        let mut entries: Vec<_> = counts.iter().collect();
        entries.sort();
        let joined = entries
            .iter()
            .map(|(tag, count)| format!("{}: {}", tag, count))
            .collect::<Vec<_>>()
            .join(", ");
        println!("  {}: {}", label, joined);
    }

    let query = {
        let args: Vec<String> = env::args().skip(1).collect();
        if args.is_empty() {
            "How to get player data in QBCore?".to_string()
        } else {
            args.join(" ")
        }
    };

    let options = SearchOptions {
        top_k: 3,
        ..Default::default()
    };
    let context = pipeline
        .search(&query, &options)
        .await
        .context("search failed")?;

    println!(
        "\nFound {} results in {}ms for: {}",
        context.total_results, context.search_time_ms, context.query
    );
    for (index, result) in context.results.iter().enumerate() {
        let title = result
            .chunk
            .metadata
            .title
            .as_deref()
            .unwrap_or(&result.chunk.metadata.doc_type);
        println!("  {}. {} (score: {:.3})", index + 1, title, result.score);
    }

    Ok(())
}
