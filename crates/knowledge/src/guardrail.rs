//! Domain guardrail: decides whether a question belongs to the office domain.
//!
//! Rules are data, not branches. A [`GuardrailRules`] table holds a blocklist,
//! an allowlist of domain keywords and one fallback pattern; [`KeywordGuardrail`]
//! evaluates them in that order:
//!
//! 1. any blocked topic in the question rejects it, whatever else it contains;
//! 2. any domain keyword accepts it;
//! 3. any caller-supplied extra term accepts it;
//! 4. the fallback pattern ("our office", "the building", ...) accepts it;
//! 5. otherwise it is rejected.
//!
//! Matching is case-insensitive substring matching, so a keyword embedded in a
//! longer word still matches.

use crate::refusal;
use office_rag_core::{AppError, AppResult};
use regex::Regex;
use serde::{Deserialize, Serialize};

const OFFICE_KEYWORDS: &[&str] = &[
    // Facilities
    "office",
    "meeting room",
    "conference room",
    "facility",
    "workspace",
    "desk",
    "parking",
    "cafeteria",
    "kitchen",
    "lobby",
    "reception",
    "floor",
    "building",
    "elevator",
    "restroom",
    "break room",
    // Policies
    "policy",
    "procedure",
    "guideline",
    "protocol",
    "standard",
    "regulation",
    "compliance",
    "rule",
    "handbook",
    "manual",
    // Operations
    "reservation",
    "booking",
    "schedule",
    "calendar",
    "appointment",
    "visitor",
    "access",
    "badge",
    "keycard",
    "security",
    // Equipment
    "equipment",
    "supply",
    "supplies",
    "printer",
    "copier",
    "scanner",
    "projector",
    "whiteboard",
    "stationery",
    "furniture",
    // Documents
    "document",
    "form",
    "template",
    "report",
    "memo",
    "notice",
    "announcement",
    "newsletter",
    // Services
    "amenity",
    "amenities",
    "service",
    "resource",
    "mail",
    "mailroom",
    "cleaning",
    "maintenance",
    "hvac",
    "air conditioning",
    "heating",
    // Employee topics
    "dress code",
    "work hours",
    "working hours",
    "remote work",
    "hybrid",
    "attendance",
    "leave",
    "holiday",
    "vacation",
    "onboarding",
    "orientation",
    // Safety
    "fire drill",
    "emergency",
    "evacuation",
    "first aid",
    "safety",
];

const BLOCKED_TOPICS: &[&str] = &[
    "stock price",
    "investment",
    "crypto",
    "bitcoin",
    "dating",
    "relationship",
    "recipe",
    "cooking",
    "weather forecast",
    "sports score",
    "game score",
    "movie",
    "tv show",
    "netflix",
    "politics",
    "election",
    "vote",
    "religion",
];

const OFFICE_FALLBACK_PATTERN: &str =
    r"\b(the|our|my|this)\s+(office|room|building|floor|team|department|company)\b";

/// Rule table driving a [`KeywordGuardrail`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardrailRules {
    /// Phrases that reject a question outright
    pub blocked_topics: Vec<String>,

    /// Phrases that mark a question as in-domain
    pub domain_keywords: Vec<String>,

    /// Regex tried last against the lower-cased question
    pub fallback_pattern: Option<String>,
}

impl GuardrailRules {
    /// The office rule set.
    pub fn office() -> Self {
        Self {
            blocked_topics: BLOCKED_TOPICS.iter().map(|s| s.to_string()).collect(),
            domain_keywords: OFFICE_KEYWORDS.iter().map(|s| s.to_string()).collect(),
            fallback_pattern: Some(OFFICE_FALLBACK_PATTERN.to_string()),
        }
    }
}

impl Default for GuardrailRules {
    fn default() -> Self {
        Self::office()
    }
}

/// Classifies questions as in or out of scope.
pub trait DomainGuardrail: Send + Sync {
    /// `true` when the question is in scope.
    fn classify(&self, question: &str, extra_terms: Option<&[String]>) -> bool;

    /// The out-of-scope refusal for a rejected question, `None` otherwise.
    fn format_refusal(&self, question: &str, extra_terms: Option<&[String]>) -> Option<&'static str> {
        if self.classify(question, extra_terms) {
            None
        } else {
            Some(refusal::OUT_OF_SCOPE)
        }
    }
}

/// Guardrail backed by a [`GuardrailRules`] table.
#[derive(Debug, Clone)]
pub struct KeywordGuardrail {
    blocked_topics: Vec<String>,
    domain_keywords: Vec<String>,
    fallback: Option<Regex>,
}

impl KeywordGuardrail {
    /// Build a guardrail, lower-casing every phrase and compiling the fallback pattern.
    pub fn new(rules: GuardrailRules) -> AppResult<Self> {
        let fallback = rules
            .fallback_pattern
            .as_deref()
            .map(Regex::new)
            .transpose()
            .map_err(|e| AppError::Config(format!("Invalid guardrail pattern: {}", e)))?;

        Ok(Self {
            blocked_topics: normalize(rules.blocked_topics),
            domain_keywords: normalize(rules.domain_keywords),
            fallback,
        })
    }

    /// Guardrail with the office rule set.
    pub fn office() -> AppResult<Self> {
        Self::new(GuardrailRules::office())
    }

    /// First blocked topic found in the question, if any.
    pub fn blocked_topic(&self, question: &str) -> Option<&str> {
        self.find_blocked(&question.to_lowercase())
    }

    fn find_blocked(&self, lower: &str) -> Option<&str> {
        self.blocked_topics
            .iter()
            .find(|topic| lower.contains(topic.as_str()))
            .map(String::as_str)
    }
}

impl DomainGuardrail for KeywordGuardrail {
    fn classify(&self, question: &str, extra_terms: Option<&[String]>) -> bool {
        let lower = question.to_lowercase();

        if let Some(topic) = self.find_blocked(&lower) {
            tracing::debug!("Question matches blocked topic '{}'", topic);
            return false;
        }

        if self.domain_keywords.iter().any(|k| lower.contains(k.as_str())) {
            return true;
        }

        if let Some(terms) = extra_terms {
            let matched = terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .any(|t| !t.is_empty() && lower.contains(&t));
            if matched {
                return true;
            }
        }

        self.fallback
            .as_ref()
            .is_some_and(|pattern| pattern.is_match(&lower))
    }
}

fn normalize(phrases: Vec<String>) -> Vec<String> {
    phrases
        .into_iter()
        .map(|p| p.trim().to_lowercase())
        .filter(|p| !p.is_empty())
        .collect()
}
