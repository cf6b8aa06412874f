//! Document ingestion: walk source paths, chunk text files, embed and store.

use crate::chunker::chunk_text;
use crate::index::SqliteVectorStore;
use crate::types::ChunkCandidate;
use crate::vector_index::VectorStore;
use office_rag_core::{AppConfig, AppError, AppResult};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::time::Instant;
use walkdir::WalkDir;

/// File extensions read as plain text.
pub const SUPPORTED_EXTENSIONS: &[&str] = &["txt", "md"];

/// What to ingest and how to split it.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    /// Files or directories; directories are walked recursively
    pub paths: Vec<PathBuf>,

    /// Clear the collection before storing new chunks
    pub reset: bool,

    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl IngestOptions {
    /// Options from configuration; no `paths` means the configured documents directory.
    pub fn from_config(config: &AppConfig, paths: Vec<PathBuf>, reset: bool) -> Self {
        let paths = if paths.is_empty() {
            vec![config.documents_dir()]
        } else {
            paths
        };

        Self {
            paths,
            reset,
            chunk_size: config.chunk_size,
            chunk_overlap: config.chunk_overlap,
        }
    }
}

/// Outcome of one ingestion run.
#[derive(Debug, Clone, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IngestStats {
    pub sources_count: u32,
    pub skipped_count: u32,
    pub chunks_count: usize,
    pub bytes_processed: u64,
    pub removed_count: u64,
    pub total_count: u64,
    pub duration_secs: f64,
}

/// Ingest every supported file under `options.paths` into `store`.
///
/// Fails without touching the store when no file yields any text, even with `reset`.
pub async fn ingest(store: &SqliteVectorStore, options: &IngestOptions) -> AppResult<IngestStats> {
    let start = Instant::now();
    let mut stats = IngestStats::default();

    let files = collect_files(&options.paths)?;
    tracing::info!("Found {} candidate files", files.len());

    let mut chunks: Vec<ChunkCandidate> = Vec::new();
    for path in &files {
        let text = match tokio::fs::read_to_string(path).await {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("Skipping {:?}: {}", path, e);
                stats.skipped_count += 1;
                continue;
            }
        };

        let candidates = chunk_text(
            &path.to_string_lossy(),
            &text,
            options.chunk_size,
            options.chunk_overlap,
        );
        if candidates.is_empty() {
            tracing::warn!("Skipping {:?}: no text", path);
            stats.skipped_count += 1;
            continue;
        }

        tracing::debug!("Loaded {:?}: {} chunks", path, candidates.len());
        stats.sources_count += 1;
        stats.bytes_processed += text.len() as u64;
        chunks.extend(candidates);
    }

    if chunks.is_empty() {
        return Err(AppError::Knowledge(format!(
            "No documents found in {:?} (supported: {})",
            options.paths,
            SUPPORTED_EXTENSIONS.join(", ")
        )));
    }

    if options.reset {
        tracing::info!("Resetting collection '{}'", store.collection_name());
        stats.removed_count = store.reset().await?;
    }

    stats.chunks_count = store.add_chunks(chunks).await?;
    stats.total_count = store.count().await?;
    stats.duration_secs = start.elapsed().as_secs_f64();

    tracing::info!(
        "Ingested {} sources ({} chunks, {} bytes) in {:.2}s",
        stats.sources_count,
        stats.chunks_count,
        stats.bytes_processed,
        stats.duration_secs
    );

    Ok(stats)
}

/// Expand `paths` into a sorted list of supported files.
pub fn collect_files(paths: &[PathBuf]) -> AppResult<Vec<PathBuf>> {
    let mut files = Vec::new();

    for path in paths {
        if path.is_file() {
            if is_supported(path) {
                files.push(path.clone());
            } else {
                tracing::warn!("Skipping unsupported file {:?}", path);
            }
        } else if path.is_dir() {
            for entry in WalkDir::new(path)
                .follow_links(false)
                .into_iter()
                .filter_map(|e| e.ok())
            {
                let entry_path = entry.path();
                if entry_path.is_file() && is_supported(entry_path) {
                    files.push(entry_path.to_path_buf());
                }
            }
        } else {
            return Err(AppError::Knowledge(format!(
                "Documents path not found: {:?}",
                path
            )));
        }
    }

    files.sort();
    files.dedup();
    Ok(files)
}

fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| SUPPORTED_EXTENSIONS.contains(&ext.to_lowercase().as_str()))
        .unwrap_or(false)
}
