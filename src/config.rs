//! Configuration management for chatai
//!
//! This module handles loading, parsing, validating, and managing
//! configuration from files, environment variables, and CLI overrides.

use crate::error::{ChataiError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Main configuration structure for chatai
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Backend server endpoints and HTTP settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Chat stream framing settings
    #[serde(default)]
    pub stream: StreamConfig,
    /// Terminal rendering settings
    #[serde(default)]
    pub render: RenderConfig,
}

/// Backend server configuration
///
/// Endpoint paths are joined onto `base_url` verbatim, so a base URL with a
/// path prefix (e.g. `/chataidesign`) is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Base URL of the backend service
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Path of the streaming chat endpoint
    #[serde(default = "default_chat_path")]
    pub chat_path: String,

    /// Path of the login endpoint
    #[serde(default = "default_login_path")]
    pub login_path: String,

    /// Path of the registration endpoint
    #[serde(default = "default_register_path")]
    pub register_path: String,

    /// Timeout applied to each HTTP request, including a full stream (seconds)
    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080/chataidesign".to_string()
}

fn default_chat_path() -> String {
    "/chat/stream".to_string()
}

fn default_login_path() -> String {
    "/user/auth/login".to_string()
}

fn default_register_path() -> String {
    "/user/auth/register".to_string()
}

fn default_timeout_seconds() -> u64 {
    300
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            chat_path: default_chat_path(),
            login_path: default_login_path(),
            register_path: default_register_path(),
            timeout_seconds: default_timeout_seconds(),
        }
    }
}

impl ServerConfig {
    /// Build the absolute URL for an endpoint path
    ///
    /// # Examples
    ///
    /// ```
    /// use chatai::config::ServerConfig;
    ///
    /// let server = ServerConfig::default();
    /// assert_eq!(
    ///     server.endpoint(&server.chat_path),
    ///     "http://127.0.0.1:8080/chataidesign/chat/stream"
    /// );
    /// ```
    pub fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

/// Chat stream framing configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Prefix that marks a line as a record
    #[serde(default = "default_record_prefix")]
    pub record_prefix: String,

    /// Payload that ends the stream
    #[serde(default = "default_done_sentinel")]
    pub done_sentinel: String,
}

fn default_record_prefix() -> String {
    "data:".to_string()
}

fn default_done_sentinel() -> String {
    "[DONE]".to_string()
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            record_prefix: default_record_prefix(),
            done_sentinel: default_done_sentinel(),
        }
    }
}

/// Terminal rendering configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RenderConfig {
    /// How accumulated response text is formatted for display
    #[serde(default)]
    pub format: RenderFormat,

    /// Show an "AI is thinking..." line until the first fragment arrives
    #[serde(default = "default_typing_indicator")]
    pub typing_indicator: bool,
}

fn default_typing_indicator() -> bool {
    true
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            format: RenderFormat::default(),
            typing_indicator: default_typing_indicator(),
        }
    }
}

/// Display format for response text
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum RenderFormat {
    /// Text is shown as received
    #[default]
    Plain,
    /// Newlines become `<br>` tags
    LineBreak,
}

impl RenderFormat {
    fn parse_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "plain" => Some(Self::Plain),
            "line_break" | "html" => Some(Self::LineBreak),
            _ => None,
        }
    }
}

impl Config {
    /// Load configuration from file with environment and CLI overrides
    ///
    /// # Arguments
    ///
    /// * `path` - Path to configuration file
    /// * `cli` - CLI arguments for overrides
    ///
    /// # Errors
    ///
    /// Returns error if the file exists but cannot be read or parsed
    pub fn load(path: &str, cli: &crate::cli::Cli) -> Result<Self> {
        let mut config = if Path::new(path).exists() {
            Self::from_file(path)?
        } else {
            tracing::warn!("Config file not found at {}, using defaults", path);
            Self::default()
        };

        config.apply_env_vars();
        config.apply_cli_overrides(cli);

        Ok(config)
    }

    fn from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ChataiError::Config(format!("Failed to read config file: {}", e)))?;
        serde_yaml::from_str(&contents)
            .map_err(|e| ChataiError::Config(format!("Failed to parse config: {}", e)).into())
    }

    fn apply_env_vars(&mut self) {
        if let Ok(base_url) = std::env::var("CHATAI_BASE_URL") {
            tracing::debug!(base_url = %base_url, "Env override: CHATAI_BASE_URL");
            self.server.base_url = base_url;
        }

        if let Ok(chat_path) = std::env::var("CHATAI_CHAT_PATH") {
            self.server.chat_path = chat_path;
        }

        if let Ok(timeout) = std::env::var("CHATAI_TIMEOUT_SECONDS") {
            if let Ok(value) = timeout.parse() {
                self.server.timeout_seconds = value;
            } else {
                tracing::warn!("Invalid CHATAI_TIMEOUT_SECONDS: {}", timeout);
            }
        }

        if let Ok(format) = std::env::var("CHATAI_RENDER_FORMAT") {
            match RenderFormat::parse_str(&format) {
                Some(value) => self.render.format = value,
                None => tracing::warn!("Invalid render format: {}, keeping current", format),
            }
        }

        if let Ok(indicator) = std::env::var("CHATAI_TYPING_INDICATOR") {
            match indicator.parse::<bool>() {
                Ok(v) => self.render.typing_indicator = v,
                Err(_) => {
                    tracing::warn!("Invalid value for CHATAI_TYPING_INDICATOR: {}", indicator)
                }
            }
        }
    }

    fn apply_cli_overrides(&mut self, cli: &crate::cli::Cli) {
        if let Some(base_url) = &cli.base_url {
            tracing::debug!(base_url = %base_url, "CLI override: --base-url");
            self.server.base_url = base_url.clone();
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns error if the base URL is not an absolute http(s) URL, an
    /// endpoint path is empty, the timeout is zero, or a framing value is
    /// empty.
    pub fn validate(&self) -> Result<()> {
        let base = url::Url::parse(&self.server.base_url).map_err(|e| {
            ChataiError::Config(format!(
                "Invalid server.base_url '{}': {}",
                self.server.base_url, e
            ))
        })?;

        if !matches!(base.scheme(), "http" | "https") {
            return Err(ChataiError::Config(format!(
                "server.base_url must use http or https, got {}",
                base.scheme()
            ))
            .into());
        }

        for (name, value) in [
            ("server.chat_path", &self.server.chat_path),
            ("server.login_path", &self.server.login_path),
            ("server.register_path", &self.server.register_path),
        ] {
            if value.trim().is_empty() {
                return Err(ChataiError::Config(format!("{} cannot be empty", name)).into());
            }
        }

        if self.server.timeout_seconds == 0 {
            return Err(ChataiError::Config(
                "server.timeout_seconds must be greater than 0".to_string(),
            )
            .into());
        }

        if self.stream.record_prefix.is_empty() {
            return Err(
                ChataiError::Config("stream.record_prefix cannot be empty".to_string()).into(),
            );
        }

        if self.stream.done_sentinel.trim().is_empty() {
            return Err(
                ChataiError::Config("stream.done_sentinel cannot be empty".to_string()).into(),
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.server.base_url, "http://127.0.0.1:8080/chataidesign");
        assert_eq!(config.server.timeout_seconds, 300);
        assert_eq!(config.stream.done_sentinel, "[DONE]");
        assert_eq!(config.render.format, RenderFormat::Plain);
    }

    #[test]
    fn test_config_validation_success() {
        assert!(Config::default().validate().is_ok());
    }

    #[test]
    fn test_config_validation_invalid_base_url() {
        let mut config = Config::default();
        config.server.base_url = "not a url".to_string();
        assert!(config.validate().is_err());

        config.server.base_url = "ftp://example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_path() {
        let mut config = Config::default();
        config.server.chat_path = "  ".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_zero_timeout() {
        let mut config = Config::default();
        config.server.timeout_seconds = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_validation_empty_sentinel() {
        let mut config = Config::default();
        config.stream.done_sentinel = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_endpoint_joins_slashes() {
        let mut server = ServerConfig::default();
        server.base_url = "http://localhost:9000/api/".to_string();
        assert_eq!(server.endpoint("/chat"), "http://localhost:9000/api/chat");
        assert_eq!(server.endpoint("chat"), "http://localhost:9000/api/chat");
    }

    #[test]
    fn test_config_from_yaml() {
        let yaml = r#"
server:
  base_url: http://localhost:3000
  chat_path: /v1/stream
  timeout_seconds: 60
stream:
  done_sentinel: "[END]"
render:
  format: line_break
  typing_indicator: false
"#;

        let config: Config = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.server.base_url, "http://localhost:3000");
        assert_eq!(config.server.chat_path, "/v1/stream");
        assert_eq!(config.server.login_path, "/user/auth/login");
        assert_eq!(config.server.timeout_seconds, 60);
        assert_eq!(config.stream.done_sentinel, "[END]");
        assert_eq!(config.stream.record_prefix, "data:");
        assert_eq!(config.render.format, RenderFormat::LineBreak);
        assert!(!config.render.typing_indicator);
    }

    #[test]
    fn test_load_nonexistent_file_uses_defaults() {
        let cli = crate::cli::Cli::default();
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.server.chat_path, "/chat/stream");
    }

    #[test]
    fn test_cli_base_url_override() {
        let cli = crate::cli::Cli {
            base_url: Some("http://override:1234".to_string()),
            ..Default::default()
        };
        let config = Config::load("nonexistent.yaml", &cli).unwrap();
        assert_eq!(config.server.base_url, "http://override:1234");
    }

    #[test]
    #[serial]
    fn test_env_overrides() {
        std::env::set_var("CHATAI_BASE_URL", "http://env-host:8081");
        std::env::set_var("CHATAI_TIMEOUT_SECONDS", "42");
        std::env::set_var("CHATAI_RENDER_FORMAT", "html");

        let mut config = Config::default();
        config.apply_env_vars();

        std::env::remove_var("CHATAI_BASE_URL");
        std::env::remove_var("CHATAI_TIMEOUT_SECONDS");
        std::env::remove_var("CHATAI_RENDER_FORMAT");

        assert_eq!(config.server.base_url, "http://env-host:8081");
        assert_eq!(config.server.timeout_seconds, 42);
        assert_eq!(config.render.format, RenderFormat::LineBreak);
    }

    #[test]
    #[serial]
    fn test_invalid_env_timeout_is_ignored() {
        std::env::set_var("CHATAI_TIMEOUT_SECONDS", "soon");
        let mut config = Config::default();
        config.apply_env_vars();
        std::env::remove_var("CHATAI_TIMEOUT_SECONDS");

        assert_eq!(config.server.timeout_seconds, 300);
    }
}
