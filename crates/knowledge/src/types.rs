//! Retrieval value types.

use office_rag_prompt::ContextPassage;
use serde::{Deserialize, Serialize};

/// Placeholder used when a chunk carries no filename.
pub const UNKNOWN_SOURCE: &str = "Unknown";

/// Provenance recorded for a chunk at indexing time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Full path of the source document
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_path: Option<String>,

    /// File name of the source document (e.g., "handbook.pdf")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Document type (e.g., "pdf", "docx", "txt")
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

impl ChunkMetadata {
    /// Metadata for a file, deriving name and type from the path.
    pub fn for_path(path: &str) -> Self {
        let filename = path.rsplit(['/', '\\']).next().unwrap_or(path).to_string();
        let file_type = filename
            .rsplit_once('.')
            .map(|(_, ext)| ext.to_lowercase())
            .filter(|ext| !ext.is_empty());

        Self {
            source_path: Some(path.to_string()),
            filename: Some(filename),
            file_type,
        }
    }
}

/// A slice of a source document waiting to be embedded and stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkCandidate {
    /// Stable id: `<source path>#<position>`, so re-ingesting a file replaces its chunks
    pub id: String,
    pub position: u32,
    pub text: String,
    pub metadata: ChunkMetadata,
}

/// A chunk returned by the vector store for one query.
///
/// `distance` is cosine distance: smaller means more similar (0..2).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedChunk {
    pub text: String,
    #[serde(default)]
    pub metadata: ChunkMetadata,
    pub distance: f32,
}

impl RetrievedChunk {
    pub fn new(text: impl Into<String>, metadata: ChunkMetadata, distance: f32) -> Self {
        Self {
            text: text.into(),
            metadata,
            distance,
        }
    }

    /// Source filename, or `"Unknown"` when the metadata lacks one.
    pub fn filename(&self) -> &str {
        self.metadata.filename.as_deref().unwrap_or(UNKNOWN_SOURCE)
    }
}

impl ContextPassage for RetrievedChunk {
    fn source_label(&self) -> &str {
        self.filename()
    }

    fn text(&self) -> &str {
        &self.text
    }
}
