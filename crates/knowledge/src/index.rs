//! SQLite-backed vector store.
//!
//! Chunks are kept in one table keyed by `(collection, id)` with the
//! embedding stored as little-endian `f32` bytes. Search embeds the query,
//! scores every chunk of the collection by cosine distance and keeps the
//! `top_k` closest.

use crate::embeddings::EmbeddingProvider;
use crate::types::{ChunkCandidate, ChunkMetadata, RetrievedChunk};
use crate::vector_index::VectorStore;
use async_trait::async_trait;
use office_rag_core::{AppError, AppResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

const SCHEMA: &str = r#"
    CREATE TABLE IF NOT EXISTS chunks (
        collection TEXT NOT NULL,
        id TEXT NOT NULL,
        text TEXT NOT NULL,
        embedding BLOB NOT NULL,
        metadata TEXT NOT NULL DEFAULT '{}',
        PRIMARY KEY (collection, id)
    );

    CREATE INDEX IF NOT EXISTS idx_chunks_collection ON chunks(collection);
"#;

/// Vector store over a SQLite index file.
///
/// Blocking SQLite work runs on tokio's blocking pool.
pub struct SqliteVectorStore {
    conn: Arc<Mutex<Connection>>,
    collection: String,
    embedder: Arc<dyn EmbeddingProvider>,
}

impl SqliteVectorStore {
    /// Open (or create) the index at `db_path`.
    pub fn open(
        db_path: &Path,
        collection: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        if let Some(parent) = db_path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                AppError::Knowledge(format!("Failed to create index directory: {}", e))
            })?;
        }

        let conn = Connection::open(db_path)
            .map_err(|e| AppError::Knowledge(format!("Failed to open SQLite index: {}", e)))?;

        tracing::debug!("Opened SQLite index at {:?}", db_path);
        Self::with_connection(conn, collection.into(), embedder)
    }

    /// Open a private in-memory index.
    pub fn in_memory(
        collection: impl Into<String>,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| AppError::Knowledge(format!("Failed to open in-memory index: {}", e)))?;
        Self::with_connection(conn, collection.into(), embedder)
    }

    fn with_connection(
        conn: Connection,
        collection: String,
        embedder: Arc<dyn EmbeddingProvider>,
    ) -> AppResult<Self> {
        conn.execute_batch(SCHEMA)
            .map_err(|e| AppError::Knowledge(format!("Failed to create tables: {}", e)))?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            collection,
            embedder,
        })
    }

    /// Insert or replace a chunk with a precomputed embedding.
    pub fn upsert(
        &self,
        id: &str,
        text: &str,
        embedding: &[f32],
        metadata: &ChunkMetadata,
    ) -> AppResult<()> {
        insert_chunk(&*lock(&self.conn)?, &self.collection, id, text, embedding, metadata)
    }

    /// Embed `chunks` and store them, replacing chunks with the same id.
    ///
    /// Returns the number of chunks written.
    pub async fn add_chunks(&self, chunks: Vec<ChunkCandidate>) -> AppResult<usize> {
        if chunks.is_empty() {
            return Ok(0);
        }

        let mut embedded = Vec::with_capacity(chunks.len());
        for chunk in chunks {
            let embedding = self.embedder.embed(&chunk.text).await?;
            embedded.push((chunk, embedding));
        }

        let conn = self.conn.clone();
        let collection = self.collection.clone();
        tokio::task::spawn_blocking(move || {
            let mut guard = lock(&conn)?;
            let tx = guard
                .transaction()
                .map_err(|e| AppError::Knowledge(format!("Failed to begin transaction: {}", e)))?;

            for (chunk, embedding) in &embedded {
                insert_chunk(
                    &tx,
                    &collection,
                    &chunk.id,
                    &chunk.text,
                    embedding,
                    &chunk.metadata,
                )?;
            }

            tx.commit()
                .map_err(|e| AppError::Knowledge(format!("Failed to commit chunks: {}", e)))?;

            tracing::debug!("Stored {} chunks in '{}'", embedded.len(), collection);
            Ok(embedded.len())
        })
        .await
        .map_err(join_error)?
    }

    /// Remove every chunk of this collection. Returns the number removed.
    pub async fn reset(&self) -> AppResult<u64> {
        let conn = self.conn.clone();
        let collection = self.collection.clone();
        tokio::task::spawn_blocking(move || {
            let removed = lock(&conn)?
                .execute("DELETE FROM chunks WHERE collection = ?1", params![collection])
                .map_err(|e| AppError::Knowledge(format!("Failed to reset collection: {}", e)))?;

            tracing::info!("Removed {} chunks from '{}'", removed, collection);
            Ok(removed as u64)
        })
        .await
        .map_err(join_error)?
    }
}

#[async_trait]
impl VectorStore for SqliteVectorStore {
    fn collection_name(&self) -> &str {
        &self.collection
    }

    async fn search(&self, query: &str, top_k: usize) -> AppResult<Vec<RetrievedChunk>> {
        let query_embedding = self.embedder.embed(query).await?;

        let conn = self.conn.clone();
        let collection = self.collection.clone();
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn)?;
            nearest(&guard, &collection, &query_embedding, top_k)
        })
        .await
        .map_err(join_error)?
    }

    async fn count(&self) -> AppResult<u64> {
        let conn = self.conn.clone();
        let collection = self.collection.clone();
        tokio::task::spawn_blocking(move || {
            let guard = lock(&conn)?;
            count_chunks(&guard, &collection)
        })
        .await
        .map_err(join_error)?
    }
}

fn lock(conn: &Mutex<Connection>) -> AppResult<MutexGuard<'_, Connection>> {
    conn.lock()
        .map_err(|_| AppError::Knowledge("SQLite index lock poisoned".to_string()))
}

fn join_error(e: tokio::task::JoinError) -> AppError {
    AppError::Knowledge(format!("Index task failed: {}", e))
}

fn insert_chunk(
    conn: &Connection,
    collection: &str,
    id: &str,
    text: &str,
    embedding: &[f32],
    metadata: &ChunkMetadata,
) -> AppResult<()> {
    let metadata_json = serde_json::to_string(metadata)?;

    conn.execute(
        "INSERT OR REPLACE INTO chunks (collection, id, text, embedding, metadata)
         VALUES (?1, ?2, ?3, ?4, ?5)",
        params![
            collection,
            id,
            text,
            embedding_to_bytes(embedding),
            metadata_json
        ],
    )
    .map_err(|e| AppError::Knowledge(format!("Failed to insert chunk: {}", e)))?;

    Ok(())
}

/// Rank every chunk of `collection` against `query_embedding`.
fn nearest(
    conn: &Connection,
    collection: &str,
    query_embedding: &[f32],
    top_k: usize,
) -> AppResult<Vec<RetrievedChunk>> {
    let mut stmt = conn
        .prepare("SELECT id, text, embedding, metadata FROM chunks WHERE collection = ?1")
        .map_err(|e| AppError::Knowledge(format!("Failed to prepare query: {}", e)))?;

    let rows = stmt
        .query_map(params![collection], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, Vec<u8>>(2)?,
                row.get::<_, String>(3)?,
            ))
        })
        .map_err(|e| AppError::Knowledge(format!("Failed to query chunks: {}", e)))?;

    let mut results = Vec::new();
    for row in rows {
        let (id, text, embedding_bytes, metadata_json) =
            row.map_err(|e| AppError::Knowledge(format!("Failed to read chunk: {}", e)))?;

        let embedding = bytes_to_embedding(&embedding_bytes)?;
        let metadata = serde_json::from_str::<ChunkMetadata>(&metadata_json)
            .unwrap_or_else(|e| {
                tracing::warn!("Chunk '{}' has unreadable metadata: {}", id, e);
                ChunkMetadata::default()
            });

        let distance = cosine_distance(query_embedding, &embedding);
        results.push(RetrievedChunk::new(text, metadata, distance));
    }

    results.sort_by(|a, b| {
        a.distance
            .partial_cmp(&b.distance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    results.truncate(top_k);

    tracing::debug!(
        "Retrieved {} chunks from '{}' (requested top-{})",
        results.len(),
        collection,
        top_k
    );

    Ok(results)
}

fn count_chunks(conn: &Connection, collection: &str) -> AppResult<u64> {
    conn.query_row(
        "SELECT COUNT(*) FROM chunks WHERE collection = ?1",
        params![collection],
        |row| row.get::<_, i64>(0),
    )
    .map(|n| n.max(0) as u64)
    .map_err(|e| AppError::Knowledge(format!("Failed to count chunks: {}", e)))
}

impl std::fmt::Debug for SqliteVectorStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SqliteVectorStore")
            .field("collection", &self.collection)
            .field("embedder", &self.embedder)
            .finish_non_exhaustive()
    }
}

/// Convert embedding vector to bytes for storage.
fn embedding_to_bytes(embedding: &[f32]) -> Vec<u8> {
    embedding.iter().flat_map(|v| v.to_le_bytes()).collect()
}

/// Convert bytes back to embedding vector.
fn bytes_to_embedding(bytes: &[u8]) -> AppResult<Vec<f32>> {
    if bytes.len() % 4 != 0 {
        return Err(AppError::Knowledge(
            "Invalid embedding bytes length".to_string(),
        ));
    }

    Ok(bytes
        .chunks_exact(4)
        .map(|c| f32::from_le_bytes([c[0], c[1], c[2], c[3]]))
        .collect())
}

/// Cosine distance (`1 - cosine similarity`). Mismatched or zero vectors are
/// treated as orthogonal.
fn cosine_distance(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() {
        return 1.0;
    }

    let dot_product: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 1.0;
    }

    1.0 - dot_product / (norm_a * norm_b)
}
