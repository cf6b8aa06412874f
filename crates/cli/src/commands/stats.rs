//! Stats command handler.
//!
//! Reports the size of the indexed document collection.

use clap::Args;
use office_rag_core::{config::AppConfig, AppResult};
use office_rag_knowledge::open_store;
use serde_json::json;

/// Show index statistics
#[derive(Args, Debug)]
pub struct StatsCommand {
    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl StatsCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing stats command");

        let store = open_store(config)?;
        let document_count = store.count().await?;
        let collection_name = store.collection_name();

        if self.json {
            let stats = json!({
                "document_count": document_count,
                "collection_name": collection_name,
            });
            println!("{}", serde_json::to_string_pretty(&stats)?);
        } else {
            println!("Collection: {}", collection_name);
            println!("Document chunks: {}", document_count);
            println!("Index: {}", config.index_path().display());
        }

        Ok(())
    }
}
