//! Query result types.

use crate::refusal;
use serde::{Deserialize, Serialize};

/// How a query ended.
///
/// Soft refusals are ordinary outcomes, not errors; only service failures
/// propagate as `Err` out of the orchestrator.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum QueryOutcome {
    /// Answer generated from retrieved context
    #[default]
    Answered,

    /// Guardrail rejected the question before retrieval
    OutOfScope,

    /// Nothing retrieved cleared the relevance cutoff
    NoRelevantContext,

    /// Generated text carried a hallucination marker and was replaced
    Ungrounded,
}

/// Response from an office question.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResult {
    /// Answer text or a fixed refusal
    pub answer: String,

    /// Source filenames, deduplicated in first-occurrence order
    pub sources: Vec<String>,

    /// True only when the guardrail rejected the question
    pub was_filtered: bool,

    /// Internal: outcome tag for logging and callers that want it
    #[serde(skip)]
    pub outcome: QueryOutcome,
}

impl QueryResult {
    /// Refusal for a question outside the office domain.
    pub fn out_of_scope() -> Self {
        Self {
            answer: refusal::OUT_OF_SCOPE.to_string(),
            sources: Vec::new(),
            was_filtered: true,
            outcome: QueryOutcome::OutOfScope,
        }
    }

    /// Refusal for an in-scope question with no relevant context.
    pub fn no_context() -> Self {
        Self {
            answer: refusal::NO_CONTEXT.to_string(),
            sources: Vec::new(),
            was_filtered: false,
            outcome: QueryOutcome::NoRelevantContext,
        }
    }

    /// A generated answer with its sources.
    pub fn answered(answer: impl Into<String>, sources: Vec<String>) -> Self {
        Self {
            answer: answer.into(),
            sources,
            was_filtered: false,
            outcome: QueryOutcome::Answered,
        }
    }

    /// Same result tagged with a different outcome.
    pub fn with_outcome(mut self, outcome: QueryOutcome) -> Self {
        self.outcome = outcome;
        self
    }
}
