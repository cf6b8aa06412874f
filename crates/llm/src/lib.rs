//! LLM integration crate for the Office RAG system.
//!
//! This crate provides a provider-agnostic chat abstraction (`LlmClient`) and the
//! `Generator` used by the query pipeline to turn a message sequence into text.
//!
//! # Providers
//! - **Ollama**: Local LLM runtime (`/api/chat`)
//!
//! # Example
//! ```no_run
//! use office_rag_llm::{Generator, Message, providers::OllamaClient};
//! use std::sync::Arc;
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = OllamaClient::new("http://localhost:11434", Duration::from_secs(120))?;
//! let generator = Generator::new(Arc::new(client), "mistral", 0.1);
//! let answer = generator
//!     .complete(&[Message::user("Where is the mailroom?")])
//!     .await?;
//! println!("{}", answer);
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod factory;
pub mod generator;
pub mod providers;
pub mod types;

// Re-export main types
pub use client::{ChatRequest, ChatResponse, LlmClient, LlmUsage};
pub use factory::create_client;
pub use generator::Generator;
pub use providers::OllamaClient;
pub use types::{Message, Role};
