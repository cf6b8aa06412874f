//! Wiring the query pipeline from configuration.

use crate::embeddings::OllamaEmbedder;
use crate::index::SqliteVectorStore;
use crate::rag::QueryOrchestrator;
use crate::vector_index::VectorStore;
use office_rag_core::{AppConfig, AppResult};
use office_rag_llm::{create_client, Generator};
use std::sync::Arc;
use std::time::Duration;

/// Open the configured SQLite index with an Ollama embedder.
pub fn open_index(config: &AppConfig) -> AppResult<SqliteVectorStore> {
    let embedder = OllamaEmbedder::new(
        &config.ollama_base_url,
        &config.embedding_model,
        Duration::from_secs(config.ollama_timeout),
    )?;

    let index_path = config.index_path();
    tracing::info!(
        "Using index {:?} (collection '{}')",
        index_path,
        config.collection_name
    );

    SqliteVectorStore::open(&index_path, &config.collection_name, Arc::new(embedder))
}

/// [`open_index`] behind the `VectorStore` seam used by the query pipeline.
pub fn open_store(config: &AppConfig) -> AppResult<Arc<dyn VectorStore>> {
    Ok(Arc::new(open_index(config)?))
}

/// Build the orchestrator over `store` with the configured Ollama generator.
pub fn build_orchestrator(
    config: &AppConfig,
    store: Arc<dyn VectorStore>,
) -> AppResult<QueryOrchestrator> {
    let client = create_client(
        "ollama",
        &config.ollama_base_url,
        Duration::from_secs(config.ollama_timeout),
    )?;
    let generator = Generator::new(client, &config.ollama_model, config.temperature);

    tracing::debug!("Generator ready: {:?}", generator);

    QueryOrchestrator::new(store, generator, config.retrieval_settings())
}
