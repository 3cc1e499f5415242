//! Error types for remitdesk-core
//!
//! Every failure the console can run into ends up here, with an error code,
//! a severity, and the notice severity it is surfaced with.

use remitdesk_client::ClientError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::notice::Severity;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Required input missing or malformed
    ValidationError,
    /// Draft not ready for submission
    DraftIncomplete,
    /// Vendor id not in the directory
    VendorNotFound,
    /// Payment record not found
    PaymentNotFound,
    /// No payment submitted in this session
    NoCurrentPayment,
    /// Destructive action without confirmation
    ConfirmationRequired,
    /// Backend call failed
    BackendError,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::ValidationError => write!(f, "VALIDATION_ERROR"),
            ErrorCode::DraftIncomplete => write!(f, "DRAFT_INCOMPLETE"),
            ErrorCode::VendorNotFound => write!(f, "VENDOR_NOT_FOUND"),
            ErrorCode::PaymentNotFound => write!(f, "PAYMENT_NOT_FOUND"),
            ErrorCode::NoCurrentPayment => write!(f, "NO_CURRENT_PAYMENT"),
            ErrorCode::ConfirmationRequired => write!(f, "CONFIRMATION_REQUIRED"),
            ErrorCode::BackendError => write!(f, "BACKEND_ERROR"),
        }
    }
}

/// Detailed error information for logs and JSON responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    pub code: ErrorCode,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for remitdesk-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("{message}")]
    ValidationError { message: String },

    #[error("{message}")]
    DraftIncomplete { message: String },

    #[error("Vendor not found: {id}")]
    VendorNotFound { id: u64 },

    #[error("Payment not found: {id}")]
    PaymentNotFound { id: String },

    #[error("No payment has been created in this session")]
    NoCurrentPayment,

    #[error("Confirmation required: {prompt}")]
    ConfirmationRequired { prompt: String },

    #[error("{operation} failed: {source}")]
    Backend {
        operation: String,
        #[source]
        source: ClientError,
    },
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::ValidationError { message: message.into() }
    }

    pub fn backend(operation: impl Into<String>, source: ClientError) -> Self {
        CoreError::Backend { operation: operation.into(), source }
    }

    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::ValidationError { .. } => ErrorCode::ValidationError,
            CoreError::DraftIncomplete { .. } => ErrorCode::DraftIncomplete,
            CoreError::VendorNotFound { .. } => ErrorCode::VendorNotFound,
            CoreError::PaymentNotFound { .. } => ErrorCode::PaymentNotFound,
            CoreError::NoCurrentPayment => ErrorCode::NoCurrentPayment,
            CoreError::ConfirmationRequired { .. } => ErrorCode::ConfirmationRequired,
            CoreError::Backend { .. } => ErrorCode::BackendError,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::ValidationError { .. } => ErrorSeverity::Warning,
            CoreError::DraftIncomplete { .. } => ErrorSeverity::Warning,
            CoreError::VendorNotFound { .. } => ErrorSeverity::Warning,
            CoreError::PaymentNotFound { .. } => ErrorSeverity::Info,
            CoreError::NoCurrentPayment => ErrorSeverity::Info,
            CoreError::ConfirmationRequired { .. } => ErrorSeverity::Info,
            CoreError::Backend { .. } => ErrorSeverity::Error,
        }
    }

    /// Severity of the notice shown to the operator
    pub fn notice_severity(&self) -> Severity {
        match self {
            CoreError::DraftIncomplete { .. } => Severity::Warning,
            CoreError::ConfirmationRequired { .. } => Severity::Info,
            _ => Severity::Danger,
        }
    }

    /// Text shown to the operator
    pub fn user_message(&self) -> String {
        match self {
            CoreError::ValidationError { message } | CoreError::DraftIncomplete { message } => message.clone(),
            CoreError::VendorNotFound { .. } => "選択された業者が見つかりません".to_string(),
            CoreError::PaymentNotFound { .. } => "支払データが見つかりません".to_string(),
            CoreError::NoCurrentPayment => "先に支払表を作成してください".to_string(),
            CoreError::ConfirmationRequired { prompt } => prompt.clone(),
            CoreError::Backend { operation, source } => match failure_label(operation) {
                Some(label) => format!("{}: {}", label, source.user_message()),
                None => source.user_message(),
            },
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::VendorNotFound { id } => {
                details = details.with_detail(serde_json::json!({ "vendor_id": id }));
                details = details.with_suggestion(
                    "Reload the vendor list; the vendor may have been removed with its upload file.".to_string()
                );
            }
            CoreError::PaymentNotFound { id } => {
                details = details.with_detail(serde_json::json!({ "payment_id": id }));
                details = details.with_suggestion("Reload the payment history.".to_string());
            }
            CoreError::Backend { operation, source } => {
                details = details.with_detail(serde_json::json!({
                    "operation": operation,
                    "cause": source.to_string(),
                }));
                details = details.with_suggestion(
                    "Check that the backend is reachable at the configured base_url.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Operator-facing label for a failed backend operation
fn failure_label(operation: &str) -> Option<&'static str> {
    let label = match operation {
        "list_vendors" => "業者データの読み込みに失敗しました",
        "create_vendor" => "業者の登録に失敗しました",
        "search_vendors" => "業者の検索に失敗しました",
        "list_companies" => "送金会社データの読み込みに失敗しました",
        "list_payments" => "支払履歴の読み込みに失敗しました",
        "get_payment" => "支払表の読み込みに失敗しました",
        "create_payment" => "支払表の作成に失敗しました",
        "delete_payment" => "削除に失敗しました",
        "download" => "ダウンロードに失敗しました",
        "upload_file" => "アップロードに失敗しました",
        "list_uploaded_files" => "ファイル一覧の読み込みに失敗しました",
        "delete_uploaded_file" => "ファイルの削除に失敗しました",
        "create_backup" => "バックアップ作成に失敗しました",
        "restore_backup" => "復元に失敗しました",
        "backup_status" => "バックアップ状態の確認に失敗しました",
        _ => return None,
    };
    Some(label)
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Error logger trait
pub trait ErrorLogger: Send + Sync {
    fn log_error(&self, error: &CoreError, operation: &str);
    fn log_warning(&self, message: &str, operation: &str);
}

/// Default error logger using log crate
#[derive(Debug, Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, operation: &str) {
        match error.severity() {
            ErrorSeverity::Error => log::error!(
                target: "remitdesk::error",
                "[{}] {} - Operation: {}",
                error.code(),
                error.to_details(),
                operation
            ),
            ErrorSeverity::Warning => log::warn!(
                target: "remitdesk::error",
                "[{}] {} - Operation: {}",
                error.code(),
                error,
                operation
            ),
            ErrorSeverity::Info => log::info!(
                target: "remitdesk::error",
                "[{}] {} - Operation: {}",
                error.code(),
                error,
                operation
            ),
        }
    }

    fn log_warning(&self, message: &str, operation: &str) {
        log::warn!(target: "remitdesk::error", "WARNING: {} - Operation: {}", message, operation);
    }
}

// ==================== Tests ====================
