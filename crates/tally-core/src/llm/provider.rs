//! LlmProvider trait definition.
//!
//! The core abstraction every completion backend implements. The assistant
//! only ever needs a single non-streaming completion per call.

use tally_types::llm::{CompletionRequest, CompletionResponse, LlmError};

/// Trait for completion provider backends (Gemini, OpenAI-compatible, etc.).
///
/// Uses native async fn in traits (RPITIT, Rust 2024 edition).
/// Implementations live in tally-infra (e.g., `GeminiProvider`).
pub trait LlmProvider: Send + Sync {
    /// Human-readable provider name (e.g., "gemini").
    fn name(&self) -> &str;

    /// Send a completion request and receive the full response.
    fn complete(
        &self,
        request: &CompletionRequest,
    ) -> impl std::future::Future<Output = Result<CompletionResponse, LlmError>> + Send;
}
