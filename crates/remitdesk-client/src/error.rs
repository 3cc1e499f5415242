//! Error types for remitdesk-client

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ClientError {
    /// The request never produced a response (connect, timeout, TLS)
    #[error("Transport error: {message}")]
    Transport { message: String },

    /// Non-success status; `message` is the backend's `error` text when present
    #[error("HTTP {status}: {message}")]
    Status { status: u16, message: String },

    /// The backend answered 2xx with `"success": false`
    #[error("Rejected by backend: {message}")]
    Rejected { message: String },

    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Invalid response body: {message}")]
    Decode { message: String },

    #[error("Invalid backend URL: {url}")]
    InvalidUrl { url: String },
}

impl ClientError {
    /// Message suitable for showing to the operator
    pub fn user_message(&self) -> String {
        match self {
            ClientError::Status { message, .. } | ClientError::Rejected { message } => message.clone(),
            ClientError::NotFound { resource } => format!("{} が見つかりません", resource),
            ClientError::Transport { .. } => "サーバーに接続できませんでした".to_string(),
            ClientError::Decode { .. } => "サーバーの応答を読み取れませんでした".to_string(),
            ClientError::InvalidUrl { url } => format!("接続先URLが不正です: {}", url),
        }
    }
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        if error.is_decode() {
            ClientError::Decode { message: error.to_string() }
        } else {
            ClientError::Transport { message: error.to_string() }
        }
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(error: serde_json::Error) -> Self {
        ClientError::Decode { message: error.to_string() }
    }
}

/// Result type with ClientError
pub type ClientResult<T> = Result<T, ClientError>;
