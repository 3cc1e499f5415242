//! Configuration management for remitdesk
//!
//! This module handles loading, validation, and management of
//! remitdesk configuration from YAML files.

pub mod error;

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

pub use error::{ConfigError, ConfigResult};

// ==================== Configuration Types ====================

/// Console server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Listen address
    #[serde(default = "default_host")]
    pub host: String,
    /// Listen port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}

fn default_port() -> u16 {
    8080
}

/// Payment backend connection
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Base URL the REST endpoints hang off
    #[serde(default = "default_base_url")]
    pub base_url: String,
    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:5000".to_string()
}

fn default_timeout_secs() -> u64 {
    30
}

/// Search-as-you-type settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchConfig {
    /// Idle window before a keystroke triggers a lookup
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,
    /// Upper bound on rendered suggestions
    #[serde(default = "default_max_suggestions")]
    pub max_suggestions: usize,
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            max_suggestions: default_max_suggestions(),
        }
    }
}

fn default_debounce_ms() -> u64 {
    300
}

fn default_max_suggestions() -> usize {
    10
}

/// Notice display settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NoticeConfig {
    #[serde(default = "default_dismiss_ms")]
    pub dismiss_ms: u64,
}

impl Default for NoticeConfig {
    fn default() -> Self {
        Self {
            dismiss_ms: default_dismiss_ms(),
        }
    }
}

fn default_dismiss_ms() -> u64 {
    3000
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub search: SearchConfig,
    #[serde(default)]
    pub notices: NoticeConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ConfigError::FileNotFound {
                path: path.to_string_lossy().into_owned(),
            },
            _ => ConfigError::IoError,
        })?;

        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> ConfigResult<Self> {
        let config: Config = serde_yaml::from_str(content)
            .map_err(|e| ConfigError::InvalidYaml { message: e.to_string() })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> ConfigResult<()> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        let base_url = self.backend.base_url.trim();
        if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
            return Err(ConfigError::InvalidValue {
                field: "backend.base_url".to_string(),
                reason: "Base URL must start with http:// or https://".to_string(),
            });
        }

        if self.backend.timeout_secs == 0 {
            return Err(ConfigError::InvalidValue {
                field: "backend.timeout_secs".to_string(),
                reason: "Timeout must be at least 1 second".to_string(),
            });
        }

        if self.search.debounce_ms > 5000 {
            return Err(ConfigError::InvalidValue {
                field: "search.debounce_ms".to_string(),
                reason: "Debounce window must be between 0 and 5000 ms".to_string(),
            });
        }

        if self.search.max_suggestions == 0 {
            return Err(ConfigError::InvalidValue {
                field: "search.max_suggestions".to_string(),
                reason: "At least one suggestion must be shown".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    pub fn debounce_window(&self) -> Duration {
        Duration::from_millis(self.search.debounce_ms)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.backend.timeout_secs)
    }

    /// Socket address string for the console listener
    pub fn listen_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_template_parses() {
        let config = Config::from_yaml(Config::generate_default()).unwrap();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.backend.base_url, "http://127.0.0.1:5000");
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.notices.dismiss_ms, 3000);
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = Config::from_yaml("server:\n  port: 9000\n").unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.debounce_window(), Duration::from_millis(300));
        assert_eq!(config.request_timeout(), Duration::from_secs(30));
        assert_eq!(config.listen_addr(), "127.0.0.1:9000");
    }

    #[test]
    fn test_rejects_zero_port() {
        let err = Config::from_yaml("server:\n  port: 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "server.port"));
    }

    #[test]
    fn test_rejects_non_http_backend() {
        let err = Config::from_yaml("backend:\n  base_url: ftp://example.com\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "backend.base_url"));
    }

    #[test]
    fn test_rejects_long_debounce() {
        let err = Config::from_yaml("search:\n  debounce_ms: 10000\n").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { ref field, .. } if field == "search.debounce_ms"));
    }

    #[test]
    fn test_invalid_yaml() {
        let err = Config::from_yaml("server: [unterminated").unwrap_err();
        assert!(matches!(err, ConfigError::InvalidYaml { .. }));
    }

    #[test]
    fn test_load_missing_file() {
        let err = Config::load("/nonexistent/remitdesk/config.yaml").unwrap_err();
        assert!(matches!(err, ConfigError::FileNotFound { .. }));
    }
}
