//! Retrieval-augmented answering over the office document index.

pub mod orchestrator;
pub mod sources;
pub mod types;
pub mod validator;

pub use orchestrator::{filter_relevant, QueryOrchestrator, QUERY_PREFIX};
pub use sources::unique_sources;
pub use types::{QueryOutcome, QueryResult};
pub use validator::{ResponseValidator, Verdict, HALLUCINATION_MARKERS};
