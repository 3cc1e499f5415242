//! Error types for remitdesk-config

use thiserror::Error;

/// Configuration error type
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    #[error("Invalid YAML format: {message}")]
    InvalidYaml { message: String },

    #[error("Invalid field value: {field} - {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("IO error occurred")]
    IoError,
}

impl ConfigError {
    /// Stable code for log lines
    pub fn code(&self) -> &'static str {
        match self {
            ConfigError::FileNotFound { .. } => "FILE_NOT_FOUND",
            ConfigError::InvalidYaml { .. } => "INVALID_YAML",
            ConfigError::InvalidValue { .. } => "INVALID_VALUE",
            ConfigError::IoError => "IO_ERROR",
        }
    }

    /// What the operator can do about it
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            ConfigError::FileNotFound { .. } => Some("run with --print-config > config.yaml for a starting file"),
            ConfigError::InvalidYaml { .. } => Some("compare the file with the output of --print-config"),
            ConfigError::InvalidValue { .. } | ConfigError::IoError => None,
        }
    }

    /// One-line report: `[CODE] message (hint)`
    pub fn report(&self) -> String {
        match self.hint() {
            Some(hint) => format!("[{}] {} ({})", self.code(), self, hint),
            None => format!("[{}] {}", self.code(), self),
        }
    }
}

/// Result type with ConfigError
pub type ConfigResult<T> = Result<T, ConfigError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_report_includes_code_and_hint() {
        let error = ConfigError::FileNotFound { path: "/etc/remitdesk.yaml".to_string() };
        assert_eq!(error.code(), "FILE_NOT_FOUND");
        assert_eq!(
            error.report(),
            "[FILE_NOT_FOUND] File not found: /etc/remitdesk.yaml (run with --print-config > config.yaml for a starting file)"
        );
    }

    #[test]
    fn test_invalid_value_report_names_field() {
        let error = ConfigError::InvalidValue {
            field: "server.port".to_string(),
            reason: "Port must be greater than 0".to_string(),
        };
        assert!(error.hint().is_none());
        assert_eq!(
            error.report(),
            "[INVALID_VALUE] Invalid field value: server.port - Port must be greater than 0"
        );
    }
}
