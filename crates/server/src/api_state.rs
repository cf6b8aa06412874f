//! Shared state handed to every route handler.

use std::sync::Arc;

use office_rag_core::{AppConfig, AppResult};
use office_rag_knowledge::{build_orchestrator, open_store, QueryOrchestrator, VectorStore};

/// Shared handles for request handlers, built once at startup.
#[derive(Clone)]
pub struct ApiState {
    pub orchestrator: Arc<QueryOrchestrator>,
    pub store: Arc<dyn VectorStore>,
}

impl ApiState {
    pub fn new(orchestrator: Arc<QueryOrchestrator>) -> Self {
        let store = orchestrator.store().clone();
        Self {
            orchestrator,
            store,
        }
    }

    /// Open the index and build the pipeline described by `config`.
    pub fn from_config(config: &AppConfig) -> AppResult<Self> {
        let store = open_store(config)?;
        let orchestrator = build_orchestrator(config, store)?;
        Ok(Self::new(Arc::new(orchestrator)))
    }
}
