//! Completion provider implementations.
//!
//! Contains concrete implementations of the [`LlmProvider`] trait defined in
//! `tally-core`, plus a factory ([`create_provider`]) that builds the right
//! one from the `[llm]` section of `config.toml`.
//!
//! [`LlmProvider`]: tally_core::llm::provider::LlmProvider

pub mod gemini;
pub mod openai_compat;
pub mod unconfigured;

use std::time::Duration;

use secrecy::SecretString;

use tally_core::llm::box_provider::BoxLlmProvider;
use tally_types::config::LlmConfig;
use tally_types::llm::{LlmError, ProviderType};

use self::gemini::GeminiProvider;
use self::openai_compat::OpenAiCompatibleProvider;
use self::unconfigured::UnconfiguredProvider;

/// Create a [`BoxLlmProvider`] from the `[llm]` configuration.
///
/// Without an API key the returned provider fails every completion with
/// [`LlmError::NotConfigured`], so the rest of the service still runs.
///
/// # Errors
///
/// Returns an error if the HTTP client cannot be constructed.
pub fn create_provider(
    config: &LlmConfig,
    api_key: Option<SecretString>,
) -> Result<BoxLlmProvider, LlmError> {
    let Some(key) = api_key else {
        tracing::warn!(
            provider = %config.provider,
            env = %config.api_key_env,
            "no API key found, chat completions are disabled"
        );
        return Ok(BoxLlmProvider::new(UnconfiguredProvider::new(format!(
            "{} is not set",
            config.api_key_env
        ))));
    };

    let timeout = Duration::from_secs(config.timeout_secs);
    let provider = match config.provider {
        ProviderType::Gemini => {
            let mut provider = GeminiProvider::new(key, timeout)?;
            if let Some(base_url) = config.base_url.as_deref() {
                provider = provider.with_base_url(base_url);
            }
            BoxLlmProvider::new(provider)
        }
        ProviderType::OpenAiCompatible => {
            let base_url = config
                .base_url
                .as_deref()
                .unwrap_or(openai_compat::DEFAULT_BASE_URL);
            BoxLlmProvider::new(OpenAiCompatibleProvider::new(key, base_url, timeout)?)
        }
    };

    tracing::info!(provider = provider.name(), model = %config.model, "completion provider ready");
    Ok(provider)
}
