//! Keyword veto over generated answers.
//!
//! This is not semantic grounding: an ungrounded reply that avoids every
//! marker passes.

use crate::refusal;
use crate::types::RetrievedChunk;

/// Phrases typical of a model answering from outside the supplied context.
pub const HALLUCINATION_MARKERS: &[&str] = &[
    "i don't have access",
    "as an ai",
    "i cannot browse",
    "i'm not able to",
    "my training data",
];

/// Validator decision for one response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    Grounded,
    NoContext,
    Ungrounded { marker: &'static str },
}

#[derive(Debug, Clone, Default)]
pub struct ResponseValidator;

impl ResponseValidator {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, response: &str, chunks: &[RetrievedChunk]) -> Verdict {
        if chunks.is_empty() {
            return Verdict::NoContext;
        }

        let lower = response.to_lowercase().replace('\u{2019}', "'");
        match HALLUCINATION_MARKERS
            .iter()
            .copied()
            .find(|m| lower.contains(m))
        {
            Some(marker) => Verdict::Ungrounded { marker },
            None => Verdict::Grounded,
        }
    }

    /// The response unchanged, or the no-context refusal.
    pub fn validate(&self, response: &str, chunks: &[RetrievedChunk]) -> String {
        match self.check(response, chunks) {
            Verdict::Grounded => response.to_string(),
            Verdict::NoContext => refusal::NO_CONTEXT.to_string(),
            Verdict::Ungrounded { marker } => {
                tracing::warn!("Response contains hallucination marker '{}'", marker);
                refusal::NO_CONTEXT.to_string()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ChunkMetadata;

    fn chunks() -> Vec<RetrievedChunk> {
        vec![RetrievedChunk::new(
            "Badges are issued at reception.",
            ChunkMetadata::for_path("badges.pdf"),
            0.2,
        )]
    }

    #[test]
    fn test_grounded_response_unchanged() {
        let v = ResponseValidator::new();
        let answer = "Badges are issued at reception on the ground floor.";
        assert_eq!(v.validate(answer, &chunks()), answer);
    }

    #[test]
    fn test_empty_chunks_always_refuse() {
        let v = ResponseValidator::new();
        assert_eq!(v.check("Anything", &[]), Verdict::NoContext);
        assert_eq!(v.validate("Anything", &[]), refusal::NO_CONTEXT);
    }

    #[test]
    fn test_marker_is_vetoed() {
        let v = ResponseValidator::new();
        let answer = "As an AI, I don't have access to real-time data";
        assert_eq!(
            v.check(answer, &chunks()),
            Verdict::Ungrounded {
                marker: "i don't have access"
            }
        );
        assert_eq!(v.validate(answer, &chunks()), refusal::NO_CONTEXT);
    }

    #[test]
    fn test_curly_apostrophe_marker() {
        let v = ResponseValidator::new();
        let answer = "I\u{2019}m not able to check that.";
        assert!(matches!(v.check(answer, &chunks()), Verdict::Ungrounded { .. }));
    }

    #[test]
    fn test_validate_is_idempotent_on_refusal() {
        let v = ResponseValidator::new();
        let once = v.validate("My training data says so", &chunks());
        assert_eq!(v.validate(&once, &chunks()), once);
    }
}
