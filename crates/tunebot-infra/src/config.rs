//! Server configuration loader.
//!
//! Reads `tunebot.toml` and deserializes it into [`ServerConfig`]. Falls back
//! to defaults when the file is missing or malformed.

use std::path::Path;

use tunebot_types::config::ServerConfig;

/// Default config file name, resolved against the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "tunebot.toml";

/// Load server configuration from `path`.
///
/// - If the file does not exist, returns [`ServerConfig::default()`].
/// - If the file exists but fails to parse, logs a warning and returns the default.
/// - If the file exists and parses successfully, returns the parsed config.
pub async fn load_server_config(path: &Path) -> ServerConfig {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!("No config found at {}, using defaults", path.display());
            return ServerConfig::default();
        }
        Err(err) => {
            tracing::warn!("Failed to read {}: {err}, using defaults", path.display());
            return ServerConfig::default();
        }
    };

    match toml::from_str::<ServerConfig>(&content) {
        Ok(config) => {
            tracing::debug!("Loaded config from {}", path.display());
            config
        }
        Err(err) => {
            tracing::warn!("Failed to parse {}: {err}, using defaults", path.display());
            ServerConfig::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::TempDir;
    use tunebot_types::config::DEFAULT_AUTO_PROMPT;

    #[tokio::test]
    async fn load_server_config_missing_file_returns_default() {
        let tmp = TempDir::new().unwrap();
        let config = load_server_config(&tmp.path().join(DEFAULT_CONFIG_FILE)).await;
        assert_eq!(config.auto_interval(), Duration::from_secs(10));
        assert_eq!(config.model, "gpt-4");
        assert_eq!(config.auto_prompt, DEFAULT_AUTO_PROMPT);
    }

    #[tokio::test]
    async fn load_server_config_valid_toml_returns_parsed() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        tokio::fs::write(
            &path,
            r#"
auto_interval_secs = 3
thread_id = "studio"
model = "gpt-4o"
"#,
        )
        .await
        .unwrap();

        let config = load_server_config(&path).await;
        assert_eq!(config.auto_interval_secs, 3);
        assert_eq!(config.thread_id, "studio");
        assert_eq!(config.model, "gpt-4o");
        // Unset fields keep their defaults.
        assert_eq!(config.max_agent_steps, 8);
    }

    #[tokio::test]
    async fn load_server_config_invalid_toml_returns_default() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join(DEFAULT_CONFIG_FILE);
        tokio::fs::write(&path, "auto_interval_secs = \"soon\" {{")
            .await
            .unwrap();

        let config = load_server_config(&path).await;
        assert_eq!(config.auto_interval_secs, 10);
        assert_eq!(config.thread_id, "tunebot-agent-thread");
    }
}
