//! OpenAI-compatible completion provider implementation.
//!
//! A single [`OpenAiCompatibleProvider`] serves OpenAI, local servers
//! (Ollama, llama.cpp, vLLM) and hosted gateways through a configurable
//! base URL ending in `/v1`.

pub mod types;

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use tally_core::llm::provider::LlmProvider;
use tally_types::llm::{CompletionRequest, CompletionResponse, LlmError, Usage};

use self::types::{ChatCompletionRequest, ChatCompletionResponse, ChatMessage};

/// Default base URL when none is configured.
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Provider for any API exposing `POST {base_url}/chat/completions`.
///
/// Does NOT derive Debug so the key never shows up in logs.
pub struct OpenAiCompatibleProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl OpenAiCompatibleProvider {
    pub fn new(api_key: SecretString, base_url: &str, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self) -> String {
        format!("{}/chat/completions", self.base_url)
    }

    fn to_chat_request(request: &CompletionRequest) -> ChatCompletionRequest {
        let mut messages = Vec::with_capacity(request.messages.len() + 1);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system".to_string(),
                content: Some(system.clone()),
            });
        }
        messages.extend(request.messages.iter().map(|m| ChatMessage {
            role: m.role.to_string(),
            content: Some(m.content.clone()),
        }));

        ChatCompletionRequest {
            model: request.model.clone(),
            messages,
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        }
    }
}

impl LlmProvider for OpenAiCompatibleProvider {
    fn name(&self) -> &str {
        "openai_compatible"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_chat_request(request);

        let response = self
            .client
            .post(self.url())
            .bearer_auth(self.api_key.expose_secret())
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Provider {
                message: format!("HTTP request failed: {e}"),
            })?;

        let status = response.status();
        if !status.is_success() {
            let error_body = response.text().await.unwrap_or_default();
            return Err(match status.as_u16() {
                401 | 403 => LlmError::AuthenticationFailed,
                429 => LlmError::RateLimited {
                    retry_after_ms: None,
                },
                400 => LlmError::InvalidRequest(error_body),
                _ => LlmError::Provider {
                    message: format!("HTTP {status}: {error_body}"),
                },
            });
        }

        let chat_resp: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let usage = chat_resp.usage.clone().unwrap_or_default();
        Ok(CompletionResponse {
            content: chat_resp.text(),
            model: chat_resp.model.clone().unwrap_or_else(|| request.model.clone()),
            usage: Usage {
                input_tokens: usage.prompt_tokens,
                output_tokens: usage.completion_tokens,
            },
        })
    }
}
