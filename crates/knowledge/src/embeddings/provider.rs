//! Embedding provider trait.

use office_rag_core::AppResult;

/// Turns text into an embedding vector.
#[async_trait::async_trait]
pub trait EmbeddingProvider: Send + Sync + std::fmt::Debug {
    /// Model identifier (e.g., "all-minilm")
    fn model_name(&self) -> &str;

    /// Embed a single text.
    async fn embed(&self, text: &str) -> AppResult<Vec<f32>>;
}
