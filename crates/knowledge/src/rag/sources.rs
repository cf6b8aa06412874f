//! Source attribution for answers.

use crate::types::RetrievedChunk;
use std::collections::HashSet;

/// Filenames of `chunks`, deduplicated, in order of first appearance.
pub fn unique_sources(chunks: &[RetrievedChunk]) -> Vec<String> {
    let mut seen = HashSet::new();
    chunks
        .iter()
        .map(RetrievedChunk::filename)
        .filter(|name| seen.insert(*name))
        .map(str::to_string)
        .collect()
}
