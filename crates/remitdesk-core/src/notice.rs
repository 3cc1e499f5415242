//! Transient operator notices

use serde::{Deserialize, Serialize};
use std::time::{Duration, Instant};

/// Notice severity (maps onto the console's alert colours)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Success,
    Warning,
    Danger,
    Info,
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Success => write!(f, "success"),
            Severity::Warning => write!(f, "warning"),
            Severity::Danger => write!(f, "danger"),
            Severity::Info => write!(f, "info"),
        }
    }
}

/// Follow-up action attached to a notice
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payment_id", rename_all = "snake_case")]
pub enum NoticeAction {
    DownloadPdf(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub severity: Severity,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub action: Option<NoticeAction>,
}

impl Notice {
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            severity,
            message: message.into(),
            action: None,
        }
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    pub fn danger(message: impl Into<String>) -> Self {
        Self::new(Severity::Danger, message)
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    pub fn with_action(mut self, action: NoticeAction) -> Self {
        self.action = Some(action);
        self
    }
}

/// Holds the single visible notice; a newer notice replaces the older one
/// and every notice expires after `ttl`.
#[derive(Debug)]
pub struct NoticeBoard {
    current: Option<(Notice, Instant)>,
    ttl: Duration,
}

impl NoticeBoard {
    pub fn new(ttl: Duration) -> Self {
        Self { current: None, ttl }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn post(&mut self, notice: Notice) {
        self.current = Some((notice, Instant::now()));
    }

    pub fn active(&self) -> Option<&Notice> {
        self.active_at(Instant::now())
    }

    pub fn active_at(&self, now: Instant) -> Option<&Notice> {
        match &self.current {
            Some((notice, posted)) if now.saturating_duration_since(*posted) < self.ttl => Some(notice),
            _ => None,
        }
    }

    pub fn dismiss(&mut self) {
        self.current = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_newer_notice_replaces_older() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        board.post(Notice::info("first"));
        board.post(Notice::danger("second"));

        let active = board.active().unwrap();
        assert_eq!(active.message, "second");
        assert_eq!(active.severity, Severity::Danger);
    }

    #[test]
    fn test_notice_expires() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        board.post(Notice::success("saved"));

        let later = Instant::now() + Duration::from_secs(4);
        assert!(board.active_at(later).is_none());
    }

    #[test]
    fn test_dismiss() {
        let mut board = NoticeBoard::new(Duration::from_secs(3));
        board.post(Notice::warning("careful"));
        board.dismiss();
        assert!(board.active().is_none());
    }

    #[test]
    fn test_action_serialization() {
        let notice = Notice::success("ok").with_action(NoticeAction::DownloadPdf("p1".to_string()));
        let json = serde_json::to_value(&notice).unwrap();
        assert_eq!(json["action"]["kind"], "download_pdf");
        assert_eq!(json["action"]["payment_id"], "p1");
    }
}
