//! Ingest command handler.
//!
//! Chunks text documents, embeds them through Ollama and stores them in the index.

use clap::Args;
use office_rag_core::{config::AppConfig, AppResult};
use office_rag_knowledge::{ingest, open_index, IngestOptions, IngestStats};
use std::io::Write;
use std::path::PathBuf;

/// Ingest documents into the vector store
#[derive(Args, Debug)]
pub struct IngestCommand {
    /// Files or directories to ingest (default: the configured documents directory)
    pub paths: Vec<PathBuf>,

    /// Clear the collection before ingesting
    #[arg(long)]
    pub reset: bool,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

impl IngestCommand {
    pub async fn execute(&self, config: &AppConfig) -> AppResult<()> {
        tracing::info!("Executing ingest command");

        let options = IngestOptions::from_config(config, self.paths.clone(), self.reset);
        tracing::debug!("Ingest options: {:?}", options);

        let store = open_index(config)?;
        let stats = ingest(&store, &options).await?;

        self.report(&mut std::io::stdout(), &stats)
    }

    fn report<W: Write>(&self, out: &mut W, stats: &IngestStats) -> AppResult<()> {
        if self.json {
            writeln!(out, "{}", serde_json::to_string_pretty(stats)?)?;
        } else {
            if stats.removed_count > 0 {
                writeln!(out, "Removed {} existing chunks.", stats.removed_count)?;
            }
            writeln!(
                out,
                "Ingested {} sources ({} chunks, {} bytes) in {:.2}s",
                stats.sources_count, stats.chunks_count, stats.bytes_processed, stats.duration_secs
            )?;
            if stats.skipped_count > 0 {
                writeln!(out, "Skipped {} unreadable or empty files.", stats.skipped_count)?;
            }
            writeln!(out, "Total chunks in store: {}", stats.total_count)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats() -> IngestStats {
        IngestStats {
            sources_count: 3,
            skipped_count: 1,
            chunks_count: 12,
            bytes_processed: 4096,
            removed_count: 0,
            total_count: 12,
            duration_secs: 0.5,
        }
    }

    fn command(json: bool) -> IngestCommand {
        IngestCommand {
            paths: Vec::new(),
            reset: false,
            json,
        }
    }

    #[test]
    fn test_report_text() {
        let mut out = Vec::new();
        command(false).report(&mut out, &stats()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(
            text,
            "Ingested 3 sources (12 chunks, 4096 bytes) in 0.50s\n\
             Skipped 1 unreadable or empty files.\n\
             Total chunks in store: 12\n"
        );
    }

    #[test]
    fn test_report_json() {
        let mut out = Vec::new();
        command(true).report(&mut out, &stats()).unwrap();

        let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
        assert_eq!(value["sourcesCount"], 3);
        assert_eq!(value["chunksCount"], 12);
        assert_eq!(value["totalCount"], 12);
    }

    #[tokio::test]
    async fn test_missing_path_fails_before_any_embedding() {
        let temp = tempfile::TempDir::new().unwrap();
        let config = AppConfig {
            workspace: temp.path().to_path_buf(),
            ollama_base_url: "http://127.0.0.1:9".to_string(),
            ..AppConfig::default()
        };
        let cmd = IngestCommand {
            paths: vec![temp.path().join("handbook")],
            reset: true,
            json: false,
        };

        let err = cmd.execute(&config).await.unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
