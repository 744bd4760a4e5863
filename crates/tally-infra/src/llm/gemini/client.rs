//! GeminiProvider -- concrete [`LlmProvider`] implementation for Google Gemini.
//!
//! Sends requests to `{base_url}/v1beta/models/{model}:generateContent`
//! with the key in the `x-goog-api-key` header.
//!
//! The API key is wrapped in [`secrecy::SecretString`] and is never logged
//! or included in `Debug` output.

use std::time::Duration;

use secrecy::{ExposeSecret, SecretString};

use tally_core::llm::provider::LlmProvider;
use tally_types::llm::{CompletionRequest, CompletionResponse, LlmError, MessageRole, Usage};

use super::types::{GeminiContent, GeminiPart, GeminiRequest, GeminiResponse, GenerationConfig};

/// Default public endpoint.
pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Google Gemini completion provider.
///
/// Does NOT derive Debug so the key never shows up in logs.
pub struct GeminiProvider {
    client: reqwest::Client,
    api_key: SecretString,
    base_url: String,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given HTTP timeout.
    pub fn new(api_key: SecretString, timeout: Duration) -> Result<Self, LlmError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| LlmError::Provider {
                message: format!("failed to create HTTP client: {e}"),
            })?;

        Ok(Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        })
    }

    /// Override the base URL (useful for testing or proxies).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    fn url(&self, model: &str) -> String {
        format!("{}/v1beta/models/{model}:generateContent", self.base_url)
    }

    /// Convert a generic [`CompletionRequest`] into a [`GeminiRequest`].
    fn to_gemini_request(request: &CompletionRequest) -> GeminiRequest {
        let contents = request
            .messages
            .iter()
            .filter(|m| m.role != MessageRole::System)
            .map(|m| GeminiContent {
                role: Some(match m.role {
                    MessageRole::Assistant => "model".to_string(),
                    _ => "user".to_string(),
                }),
                parts: vec![GeminiPart {
                    text: Some(m.content.clone()),
                }],
            })
            .collect();

        let system_instruction = request.system.as_ref().map(|system| GeminiContent {
            role: None,
            parts: vec![GeminiPart {
                text: Some(system.clone()),
            }],
        });

        GeminiRequest {
            contents,
            system_instruction,
            generation_config: GenerationConfig {
                max_output_tokens: request.max_tokens,
                temperature: request.temperature,
            },
        }
    }
}

impl LlmProvider for GeminiProvider {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        let body = Self::to_gemini_request(request);
        let url = self.url(&request.model);

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", self.api_key.expose_secret())
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

        let gemini_resp: GeminiResponse = response
            .json()
            .await
            .map_err(|e| LlmError::Deserialization(format!("failed to parse response: {e}")))?;

        let usage = gemini_resp.usage_metadata.clone().unwrap_or_default();
        Ok(CompletionResponse {
            content: gemini_resp.text(),
            model: gemini_resp
                .model_version
                .clone()
                .unwrap_or_else(|| request.model.clone()),
            usage: Usage {
                input_tokens: usage.prompt_token_count,
                output_tokens: usage.candidates_token_count,
            },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tally_types::llm::Message;

    fn make_provider() -> GeminiProvider {
        GeminiProvider::new(SecretString::from("test-key-not-real"), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(make_provider().name(), "gemini");
    }

    #[test]
    fn test_url_includes_model_and_trims_base() {
        let provider = make_provider().with_base_url("http://localhost:8080/");
        assert_eq!(
            provider.url("gemini-1.5-flash"),
            "http://localhost:8080/v1beta/models/gemini-1.5-flash:generateContent"
        );
    }

    #[test]
    fn test_request_conversion_maps_roles() {
        let request = CompletionRequest {
            model: "gemini-1.5-flash".to_string(),
            messages: vec![
                Message::user("hi"),
                Message {
                    role: MessageRole::Assistant,
                    content: "hello".to_string(),
                },
            ],
            system: Some("be brief".to_string()),
            max_tokens: 128,
            temperature: None,
        };

        let body = GeminiProvider::to_gemini_request(&request);
        assert_eq!(body.contents.len(), 2);
        assert_eq!(body.contents[0].role.as_deref(), Some("user"));
        assert_eq!(body.contents[1].role.as_deref(), Some("model"));
        assert!(body.system_instruction.is_some());
        assert_eq!(body.generation_config.max_output_tokens, 128);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_is_provider_error() {
        let provider = make_provider().with_base_url("http://127.0.0.1:9");
        let request = CompletionRequest {
            model: "gemini-1.5-flash".to_string(),
            messages: vec![Message::user("hi")],
            system: None,
            max_tokens: 16,
            temperature: None,
        };
        let err = provider.complete(&request).await.unwrap_err();
        assert!(matches!(err, LlmError::Provider { .. }));
    }
}
