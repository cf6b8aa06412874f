//! Prompt types.

use serde::{Deserialize, Serialize};

/// A ranked passage that can be placed in the context block.
///
/// Implemented by whatever chunk type the retrieval layer produces.
pub trait ContextPassage {
    /// Label shown in the `[Source: …]` header of the entry.
    fn source_label(&self) -> &str;

    /// Passage text.
    fn text(&self) -> &str;
}

/// Result of assembling passages under a character budget.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AssembledContext {
    /// Joined context block, never longer than the budget
    pub text: String,

    /// Number of passages included in full
    pub entries_used: usize,

    /// Number of passages dropped once the budget was reached
    pub entries_dropped: usize,
}

impl AssembledContext {
    /// Length of the context block in characters.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}
