//! Transient user-facing messages.

use std::time::Duration;

use tokio::sync::broadcast;
use tracing::debug;

pub const SHORT_NOTICE: Duration = Duration::from_millis(2000);
pub const DEFAULT_NOTICE: Duration = Duration::from_millis(3000);
pub const LONG_NOTICE: Duration = Duration::from_millis(4000);
pub const ERROR_NOTICE: Duration = Duration::from_millis(5000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub duration: Duration,
}

/// Publishing side of the notice channel. Clones share one channel.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Notice>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new(64)
    }
}

impl Notifier {
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity.max(1));
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Notice> {
        self.tx.subscribe()
    }

    pub fn publish(&self, level: NoticeLevel, message: impl Into<String>, duration: Duration) {
        let notice = Notice {
            level,
            message: message.into(),
            duration,
        };
        debug!("notice: level={:?} message={}", notice.level, notice.message);
        // No subscriber is a normal state for headless callers.
        let _ = self.tx.send(notice);
    }

    pub fn info(&self, message: impl Into<String>, duration: Duration) {
        self.publish(NoticeLevel::Info, message, duration);
    }

    pub fn success(&self, message: impl Into<String>, duration: Duration) {
        self.publish(NoticeLevel::Success, message, duration);
    }

    pub fn error(&self, message: impl Into<String>, duration: Duration) {
        self.publish(NoticeLevel::Error, message, duration);
    }
}
