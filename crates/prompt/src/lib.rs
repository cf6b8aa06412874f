//! Prompt assembly for the Office RAG system.
//!
//! This crate turns ranked passages and a question into the message sequence
//! sent to the generation service:
//! - Budget-bounded context assembly (`build_context`)
//! - Handlebars-rendered user message with a fixed system instruction (`PromptBuilder`)

pub mod builder;
pub mod context;
pub mod types;

// Re-export main types
pub use builder::{PromptBuilder, SYSTEM_PROMPT};
pub use context::{assemble_context, build_context, format_entry, ENTRY_SEPARATOR};
pub use types::{AssembledContext, ContextPassage};
