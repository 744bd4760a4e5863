//! Global configuration types for Tally.
//!
//! `GlobalConfig` represents the top-level `config.toml` in the data
//! directory. Every field has a default, so an empty file is valid.

use serde::{Deserialize, Serialize};

use crate::chat::{DEFAULT_COMPRESSION_THRESHOLD, DEFAULT_RECENT_LIMIT};
use crate::llm::ProviderType;

/// Top-level configuration for the Tally service.
///
/// Loaded from `~/.tally/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub server: ServerConfig,

    #[serde(default)]
    pub llm: LlmConfig,

    #[serde(default)]
    pub memory: MemoryConfig,

    /// Category names seeded into the database at startup.
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
}

fn default_categories() -> Vec<String> {
    ["Food", "Travel", "Shopping", "Bills", "Other"]
        .into_iter()
        .map(String::from)
        .collect()
}

impl Default for GlobalConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            llm: LlmConfig::default(),
            memory: MemoryConfig::default(),
            categories: default_categories(),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    3000
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

/// Completion provider settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    #[serde(default)]
    pub provider: ProviderType,
    #[serde(default = "default_model")]
    pub model: String,
    /// Name of the environment variable holding the API key.
    #[serde(default = "default_api_key_env")]
    pub api_key_env: String,
    /// Override the provider's default base URL.
    #[serde(default)]
    pub base_url: Option<String>,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_api_key_env() -> String {
    "GEMINI_API_KEY".to_string()
}

fn default_max_tokens() -> u32 {
    1024
}

fn default_timeout_secs() -> u64 {
    60
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider: ProviderType::default(),
            model: default_model(),
            api_key_env: default_api_key_env(),
            base_url: None,
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Chat memory policy knobs.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryConfig {
    /// Turns preceding the new message that go into the prompt.
    #[serde(default = "default_recent_window")]
    pub recent_window: usize,
    /// Compress once the stored turn count exceeds this value.
    #[serde(default = "default_compression_threshold")]
    pub compression_threshold: usize,
}

fn default_recent_window() -> usize {
    DEFAULT_RECENT_LIMIT
}

fn default_compression_threshold() -> usize {
    DEFAULT_COMPRESSION_THRESHOLD
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            recent_window: default_recent_window(),
            compression_threshold: default_compression_threshold(),
        }
    }
}
