//! Vector store abstraction.
//!
//! The query pipeline only depends on this trait; embedding the query and
//! ranking chunks are the store's business.

use crate::types::RetrievedChunk;
use async_trait::async_trait;
use office_rag_core::AppResult;

/// A searchable collection of embedded chunks.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Name of the collection backing this store.
    fn collection_name(&self) -> &str;

    /// Embed `query` and return up to `top_k` chunks, closest first.
    async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievedChunk>>;

    /// Number of chunks in the collection.
    async fn count(&self) -> AppResult<u64>;
}
