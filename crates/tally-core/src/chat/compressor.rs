//! History compressor.
//!
//! `MemoryCompressor` asks the completion service to condense a user's whole
//! turn log into a short list of facts and preferences.

use tally_types::chat::ChatTurn;
use tally_types::llm::{CompletionRequest, LlmError, Message};

use super::prompt::build_compression_prompt;
use crate::llm::box_provider::BoxLlmProvider;

/// Stateless utility for summarizing conversation history.
pub struct MemoryCompressor;

impl MemoryCompressor {
    /// Summarize `turns` into a trimmed text summary.
    ///
    /// Returns an empty string when there is nothing to summarize or the
    /// provider produced no text.
    #[tracing::instrument(
        name = "compress_history",
        skip(provider, turns),
        fields(model = %model, turn_count = turns.len())
    )]
    pub async fn summarize(
        provider: &BoxLlmProvider,
        turns: &[ChatTurn],
        model: &str,
        max_tokens: u32,
    ) -> Result<String, LlmError> {
        if turns.is_empty() {
            return Ok(String::new());
        }

        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![Message::user(build_compression_prompt(turns))],
            system: None,
            max_tokens,
            temperature: Some(0.0),
        };

        let response = provider.complete(&request).await?;
        Ok(response.content.trim().to_string())
    }
}
