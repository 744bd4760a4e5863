//! Placeholder provider used when no API key is available.
//!
//! The server still starts so expenses and the deterministic chat answers
//! keep working; free-form chat replies surface the configuration error.

use tally_core::llm::provider::LlmProvider;
use tally_types::llm::{CompletionRequest, CompletionResponse, LlmError};

pub struct UnconfiguredProvider {
    reason: String,
}

impl UnconfiguredProvider {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

impl LlmProvider for UnconfiguredProvider {
    fn name(&self) -> &str {
        "unconfigured"
    }

    async fn complete(&self, _request: &CompletionRequest) -> Result<CompletionResponse, LlmError> {
        Err(LlmError::NotConfigured(self.reason.clone()))
    }
}
