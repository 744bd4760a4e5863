//! Global configuration loader for Tally.
//!
//! Reads `config.toml` from the data directory (`~/.tally/` in production)
//! and deserializes it into [`GlobalConfig`]. Falls back to sensible defaults
//! when the file is missing or malformed.

use std::path::{Path, PathBuf};

use secrecy::SecretString;

use tally_types::config::{GlobalConfig, LlmConfig};

/// Environment variable that overrides the data directory.
pub const DATA_DIR_ENV: &str = "TALLY_DATA_DIR";

/// Resolve the data directory.
///
/// Order: `TALLY_DATA_DIR`, then `~/.tally`, then `./.tally`.
pub fn resolve_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(DATA_DIR_ENV) {
        return PathBuf::from(dir);
    }

    if let Some(home) = dirs::home_dir() {
        return home.join(".tally");
    }

    PathBuf::from(".tally")
}

/// Load global configuration from `{data_dir}/config.toml`.
///
/// - If the file does not exist, returns [`GlobalConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_global_config(data_dir: &Path) -> GlobalConfig {
    let config_path = data_dir.join("config.toml");

    let content = match tokio::fs::read_to_string(&config_path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config.toml found at {}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", config_path.display());
            return GlobalConfig::default();
        }
    };

    match toml::from_str::<GlobalConfig>(&content) {
        Ok(config) => config,
        Err(err) => {
            tracing::warn!(
                "Failed to parse {}: {err}, using defaults",
                config_path.display()
            );
            GlobalConfig::default()
        }
    }
}

/// Read the completion API key from the environment variable named by
/// `llm.api_key_env`. Blank values count as missing.
pub fn resolve_api_key(config: &LlmConfig) -> Option<SecretString> {
    std::env::var(&config.api_key_env)
        .ok()
        .filter(|value| !value.trim().is_empty())
        .map(SecretString::from)
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tally_types::llm::ProviderType;
    use tempfile::TempDir;

    #[tokio::test]
    async fn load_global_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.memory.compression_threshold, 50);
        assert_eq!(config.categories.len(), 5);
    }

    #[tokio::test]
    async fn load_global_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(
            &config_path,
            r#"
categories = ["Groceries", "Rent", "Fun"]

[server]
host = "0.0.0.0"
port = 8080

[llm]
provider = "openai_compatible"
model = "llama3.1"
base_url = "http://localhost:11434/v1"

[memory]
recent_window = 6
"#,
        )
        .await
        .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.server.host, "0.0.0.0");
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.provider, ProviderType::OpenAiCompatible);
        assert_eq!(config.llm.model, "llama3.1");
        assert_eq!(config.memory.recent_window, 6);
        assert_eq!(config.memory.compression_threshold, 50);
        assert_eq!(config.categories, vec!["Groceries", "Rent", "Fun"]);
    }

    #[tokio::test]
    async fn load_global_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config_path = tmp.path().join("config.toml");
        tokio::fs::write(&config_path, "this is not { valid toml !!!")
            .await
            .unwrap();

        let config = load_global_config(tmp.path()).await;
        assert_eq!(config.server.port, 3000);
        assert_eq!(config.llm.provider, ProviderType::Gemini);
    }

    #[test]
    fn resolve_api_key_reads_named_variable() {
        let config = LlmConfig {
            api_key_env: "TALLY_TEST_RESOLVE_API_KEY".to_string(),
            ..Default::default()
        };
        // SAFETY: the variable name is unique to this test.
        unsafe { std::env::set_var("TALLY_TEST_RESOLVE_API_KEY", "secret-value") };
        let key = resolve_api_key(&config).unwrap();
        assert_eq!(key.expose_secret(), "secret-value");

        unsafe { std::env::set_var("TALLY_TEST_RESOLVE_API_KEY", "  ") };
        assert!(resolve_api_key(&config).is_none());

        unsafe { std::env::remove_var("TALLY_TEST_RESOLVE_API_KEY") };
        assert!(resolve_api_key(&config).is_none());
    }

    #[test]
    fn resolve_data_dir_ends_with_tally() {
        if std::env::var(DATA_DIR_ENV).is_err() {
            let dir = resolve_data_dir();
            assert!(dir.ends_with(".tally"));
        }
    }
}
