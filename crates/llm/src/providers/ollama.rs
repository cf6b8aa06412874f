//! Ollama LLM provider implementation.
//!
//! Talks to the chat endpoint of a local Ollama runtime.
//! Ollama API: https://github.com/ollama/ollama/blob/main/docs/api.md

use crate::client::{ChatRequest, ChatResponse, LlmClient, LlmUsage};
use crate::types::Message;
use office_rag_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CHAT_ENDPOINT: &str = "/api/chat";

/// Ollama chat request format.
#[derive(Debug, Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    stream: bool,
    options: OllamaOptions,
}

#[derive(Debug, Serialize)]
struct OllamaOptions {
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
}

/// Ollama chat response format. Every field is optional so a sparse body
/// still parses.
#[derive(Debug, Default, Deserialize)]
struct OllamaChatResponse {
    #[serde(default)]
    model: String,
    #[serde(default)]
    message: Option<OllamaMessage>,
    #[serde(default)]
    prompt_eval_count: Option<u32>,
    #[serde(default)]
    eval_count: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

/// Ollama LLM client.
pub struct OllamaClient {
    /// Base URL for Ollama API
    base_url: String,

    /// HTTP client with the request timeout applied
    client: reqwest::Client,
}

impl OllamaClient {
    /// Create a client for `base_url` whose requests give up after `timeout`.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> AppResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| AppError::Config(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        })
    }

    fn to_ollama_request<'a>(&self, request: &'a ChatRequest) -> OllamaChatRequest<'a> {
        OllamaChatRequest {
            model: &request.model,
            messages: &request.messages,
            stream: false,
            options: OllamaOptions {
                temperature: request.temperature,
            },
        }
    }

    fn convert_response(&self, response: OllamaChatResponse) -> ChatResponse {
        let usage = LlmUsage::new(
            response.prompt_eval_count.unwrap_or(0),
            response.eval_count.unwrap_or(0),
        );

        ChatResponse {
            content: response
                .message
                .map(|m| m.content.trim().to_string())
                .unwrap_or_default(),
            model: response.model,
            usage,
        }
    }
}

#[async_trait::async_trait]
impl LlmClient for OllamaClient {
    fn provider_name(&self) -> &str {
        "ollama"
    }

    fn endpoint(&self) -> &str {
        &self.base_url
    }

    async fn complete(&self, request: &ChatRequest) -> AppResult<ChatResponse> {
        tracing::info!("Sending chat request to Ollama (model: {})", request.model);
        tracing::debug!("Request: {:?}", request);

        let url = format!("{}{}", self.base_url, CHAT_ENDPOINT);

        let response = self
            .client
            .post(&url)
            .json(&self.to_ollama_request(request))
            .send()
            .await
            .map_err(|e| {
                tracing::warn!("Ollama at {} is unreachable: {}", self.base_url, e);
                AppError::unreachable(
                    &self.base_url,
                    format!("{}. Make sure Ollama is running (ollama serve).", e),
                )
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| AppError::unreachable(&self.base_url, e.to_string()))?;

        if status != reqwest::StatusCode::OK {
            return Err(AppError::Generation {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: OllamaChatResponse =
            serde_json::from_str(&body).map_err(|e| AppError::Generation {
                status: status.as_u16(),
                body: format!("Unparseable response body ({}): {}", e, body),
            })?;

        tracing::info!("Received completion from Ollama");
        tracing::debug!("Response: {:?}", parsed);

        Ok(self.convert_response(parsed))
    }
}
