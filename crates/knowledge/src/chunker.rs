//! Character-window chunking with overlap.

use crate::types::{ChunkCandidate, ChunkMetadata};

/// Split `text` into windows of at most `chunk_size` bytes, each starting
/// `chunk_size - overlap` bytes after the previous one.
///
/// Window edges are moved onto UTF-8 boundaries. Whitespace-only windows are
/// dropped and the walk stops once a window reaches the end of the text.
pub fn chunk_text(
    source_path: &str,
    text: &str,
    chunk_size: usize,
    overlap: usize,
) -> Vec<ChunkCandidate> {
    if text.trim().is_empty() || chunk_size == 0 {
        return vec![];
    }

    let metadata = ChunkMetadata::for_path(source_path);
    let step = if chunk_size > overlap {
        chunk_size - overlap
    } else {
        chunk_size
    };

    let mut chunks = Vec::new();
    let mut position = 0u32;
    let mut start = 0;

    while start < text.len() {
        let mut end = (start + chunk_size).min(text.len());
        while end > start && !text.is_char_boundary(end) {
            end -= 1;
        }

        let window = text[start..end].trim();
        if !window.is_empty() {
            chunks.push(ChunkCandidate {
                id: format!("{}#{}", source_path, position),
                position,
                text: window.to_string(),
                metadata: metadata.clone(),
            });
            position += 1;
        }

        if end == text.len() {
            break;
        }

        let mut next_start = start + step;
        while next_start < text.len() && !text.is_char_boundary(next_start) {
            next_start += 1;
        }
        start = next_start;
    }

    tracing::debug!(
        "Chunked {} into {} chunks (size: {}, overlap: {})",
        source_path,
        chunks.len(),
        chunk_size,
        overlap
    );

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chunk_text_basic() {
        let text = "a".repeat(1000);
        let chunks = chunk_text("/docs/a.txt", &text, 200, 50);

        assert_eq!(chunks.len(), 7);
        assert_eq!(chunks[0].position, 0);
        assert_eq!(chunks[1].id, "/docs/a.txt#1");
        assert_eq!(chunks[0].metadata.filename.as_deref(), Some("a.txt"));
    }

    #[test]
    fn test_chunk_text_no_overlap() {
        let text = "a".repeat(300);
        let chunks = chunk_text("a.txt", &text, 100, 0);
        assert_eq!(chunks.len(), 3);
    }

    #[test]
    fn test_short_document_is_one_chunk() {
        let chunks = chunk_text("notes.md", "Fire drill on Friday.", 512, 50);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "Fire drill on Friday.");
    }

    #[test]
    fn test_chunk_text_empty() {
        assert!(chunk_text("a.txt", "", 100, 10).is_empty());
        assert!(chunk_text("a.txt", " \n\t ", 100, 10).is_empty());
    }

    #[test]
    fn test_chunk_text_with_overlap() {
        let text = "abcdefghijklmnopqrstuvwxyz".repeat(10);
        let chunks = chunk_text("a.txt", &text, 50, 10);

        let first_tail: String = chunks[0].text.chars().skip(40).collect();
        let second_head: String = chunks[1].text.chars().take(10).collect();
        assert_eq!(first_tail, second_head);
    }

    #[test]
    fn test_multibyte_text_splits_on_char_boundaries() {
        let text = "Büro café ".repeat(40);
        let chunks = chunk_text("a.txt", &text, 33, 5);

        assert!(chunks.len() > 1);
        assert!(text.starts_with(&chunks[0].text));
        assert!(text.trim_end().ends_with(&chunks[chunks.len() - 1].text));
    }
}
