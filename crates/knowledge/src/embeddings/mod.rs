//! Query embedding.
//!
//! The vector store embeds queries through an `EmbeddingProvider`; the
//! production provider calls Ollama's embeddings endpoint.

pub mod provider;
pub mod providers;

pub use provider::EmbeddingProvider;
pub use providers::OllamaEmbedder;
