//! Generation with fixed parameters.

use crate::client::{ChatRequest, LlmClient};
use crate::types::Message;
use office_rag_core::AppResult;
use std::sync::Arc;

/// Sends message sequences to an `LlmClient` with a fixed model and temperature.
#[derive(Clone)]
pub struct Generator {
    client: Arc<dyn LlmClient>,
    model: String,
    temperature: f32,
}

impl Generator {
    pub fn new(client: Arc<dyn LlmClient>, model: impl Into<String>, temperature: f32) -> Self {
        Self {
            client,
            model: model.into(),
            temperature,
        }
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    /// Generate a reply and return its trimmed text.
    ///
    /// Errors from the provider are passed through unchanged.
    pub async fn complete(&self, messages: &[Message]) -> AppResult<String> {
        let request =
            ChatRequest::new(&self.model, messages.to_vec()).with_temperature(self.temperature);

        let response = self.client.complete(&request).await?;

        tracing::debug!(
            "Token usage - Prompt: {}, Completion: {}, Total: {}",
            response.usage.prompt_tokens,
            response.usage.completion_tokens,
            response.usage.total_tokens
        );

        Ok(response.content)
    }
}

impl std::fmt::Debug for Generator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Generator")
            .field("provider", &self.client.provider_name())
            .field("endpoint", &self.client.endpoint())
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::{ChatResponse, LlmUsage};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingClient {
        seen: Mutex<Vec<ChatRequest>>,
    }

    #[async_trait::async_trait]
    impl LlmClient for RecordingClient {
        fn provider_name(&self) -> &str {
            "recording"
        }

        fn endpoint(&self) -> &str {
            "memory://"
        }

        async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
            self.seen.lock().unwrap().push(request.clone());
            Ok(ChatResponse {
                content: "ok".to_string(),
                model: request.model.clone(),
                usage: LlmUsage::new(10, 2),
            })
        }
    }

    #[tokio::test]
    async fn test_generator_applies_fixed_parameters() {
        let client = Arc::new(RecordingClient::default());
        let generator = Generator::new(client.clone(), "mistral", 0.1);

        let answer = generator
            .complete(&[Message::system("sys"), Message::user("question")])
            .await
            .unwrap();
        assert_eq!(answer, "ok");

        let seen = client.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].model, "mistral");
        assert_eq!(seen[0].temperature, Some(0.1));
        assert!(!seen[0].stream);
        assert_eq!(seen[0].messages.len(), 2);
    }
}
