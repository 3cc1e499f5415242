//! Error types for remitdesk-web

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use remitdesk_client::ClientError;
use remitdesk_core::CoreError;
use remitdesk_utils::escape_html;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Backend unavailable: {message}")]
    BadGateway { message: String },
}

impl WebError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        WebError::BadRequest { message: message.into() }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            WebError::NotFound { .. } => StatusCode::NOT_FOUND,
            WebError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            WebError::BadGateway { .. } => StatusCode::BAD_GATEWAY,
        }
    }
}

impl From<CoreError> for WebError {
    fn from(error: CoreError) -> Self {
        match &error {
            CoreError::Backend { source: ClientError::NotFound { .. }, .. }
            | CoreError::Backend { source: ClientError::Status { status: 404, .. }, .. }
            | CoreError::PaymentNotFound { .. }
            | CoreError::VendorNotFound { .. } => WebError::NotFound { resource: error.user_message() },
            CoreError::Backend { .. } => WebError::BadGateway { message: error.user_message() },
            _ => WebError::BadRequest { message: error.user_message() },
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!("{}", self);
        } else {
            log::warn!("{}", self);
        }

        let message = match &self {
            WebError::NotFound { resource } => resource.clone(),
            WebError::BadRequest { message } | WebError::BadGateway { message } => message.clone(),
        };
        let body = format!(
            r#"<div class='bg-red-50 border border-red-200 rounded-lg p-4'><span class='text-red-600'>✗</span> <span class='font-medium text-red-800'>{}</span></div>"#,
            escape_html(&message)
        );
        (status, Html(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_core_error_mapping() {
        let missing = CoreError::backend(
            "download",
            ClientError::Status { status: 404, message: "支払データが見つかりません".to_string() },
        );
        assert_eq!(WebError::from(missing).status(), StatusCode::NOT_FOUND);

        let offline = CoreError::backend("download", ClientError::Transport { message: "refused".to_string() });
        assert_eq!(WebError::from(offline).status(), StatusCode::BAD_GATEWAY);

        let invalid = CoreError::validation("x");
        assert_eq!(WebError::from(invalid).status(), StatusCode::BAD_REQUEST);
    }
}
