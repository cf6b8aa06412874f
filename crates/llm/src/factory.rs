//! LLM provider factory.

use crate::client::LlmClient;
use crate::providers::OllamaClient;
use office_rag_core::{AppError, AppResult};
use std::sync::Arc;
use std::time::Duration;

/// Create an LLM client for the named provider.
///
/// # Arguments
/// * `provider` - Provider identifier (currently only "ollama")
/// * `endpoint` - Base URL of the service
/// * `timeout` - Upper bound for a single request
pub fn create_client(
    provider: &str,
    endpoint: &str,
    timeout: Duration,
) -> AppResult<Arc<dyn LlmClient>> {
    match provider.to_lowercase().as_str() {
        "ollama" => {
            let client = OllamaClient::new(endpoint, timeout)?;
            Ok(Arc::new(client))
        }
        _ => Err(AppError::Config(format!(
            "Unknown provider: {}. Supported: ollama",
            provider
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_create_ollama_client() {
        let client =
            create_client("ollama", "http://localhost:8080", Duration::from_secs(5)).unwrap();
        assert_eq!(client.provider_name(), "ollama");
        assert_eq!(client.endpoint(), "http://localhost:8080");
    }

    #[test]
    fn test_unknown_provider() {
        match create_client("unknown", "http://localhost", Duration::from_secs(5)) {
            Err(err) => assert!(err.to_string().contains("Unknown provider")),
            Ok(_) => panic!("Expected error for unknown provider"),
        }
    }
}
