//! Office knowledge retrieval and question answering.
//!
//! Provides the query pipeline that answers office questions from a
//! pre-indexed document collection:
//! - `VectorStore` seam with a SQLite-backed implementation and Ollama query embeddings
//! - `DomainGuardrail` keyword rules for the office domain
//! - `QueryOrchestrator`, which sequences guardrail, retrieval, generation and validation
//! - `ingest`, which chunks text documents and fills the index

pub mod chunker;
pub mod embeddings;
pub mod guardrail;
pub mod index;
pub mod ingest;
pub mod pipeline;
pub mod rag;
pub mod refusal;
pub mod types;
pub mod vector_index;

// Re-export commonly used types
pub use embeddings::{EmbeddingProvider, OllamaEmbedder};
pub use guardrail::{DomainGuardrail, GuardrailRules, KeywordGuardrail};
pub use index::SqliteVectorStore;
pub use ingest::{ingest, IngestOptions, IngestStats};
pub use pipeline::{build_orchestrator, open_index, open_store};
pub use rag::{QueryOrchestrator, QueryOutcome, QueryResult, ResponseValidator};
pub use types::{ChunkCandidate, ChunkMetadata, RetrievedChunk, UNKNOWN_SOURCE};
pub use vector_index::VectorStore;
