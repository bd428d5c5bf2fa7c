//! User-facing notifications.
//!
//! Widgets report every failure and success as a transient [`Notice`]
//! through an injected [`Notifier`] instead of returning structured errors
//! to the page. One notifier is shared by all widgets on a page.

use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Banner severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Warning,
    Error,
    Success,
}

impl Severity {
    /// CSS-friendly tag (`info`, `warning`, `error`, `success`).
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
            Self::Success => "success",
        }
    }
}

/// A transient banner message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub severity: Severity,
    pub dismiss_after: Duration,
}

impl Notice {
    /// Default time a banner stays visible.
    pub const DEFAULT_DISMISS: Duration = Duration::from_secs(3);

    #[must_use]
    pub fn new(severity: Severity, message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            severity,
            dismiss_after: Self::DEFAULT_DISMISS,
        }
    }

    #[must_use]
    pub fn info(message: impl Into<String>) -> Self {
        Self::new(Severity::Info, message)
    }

    #[must_use]
    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(Severity::Warning, message)
    }

    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::new(Severity::Error, message)
    }

    #[must_use]
    pub fn success(message: impl Into<String>) -> Self {
        Self::new(Severity::Success, message)
    }

    /// Override how long the banner stays up.
    #[must_use]
    pub const fn dismiss_after(mut self, after: Duration) -> Self {
        self.dismiss_after = after;
        self
    }

    /// Dismiss delay in whole milliseconds, for templates.
    #[must_use]
    pub fn dismiss_after_ms(&self) -> u64 {
        u64::try_from(self.dismiss_after.as_millis()).unwrap_or(u64::MAX)
    }
}

/// Capability to show a notice to the user.
pub trait Notifier {
    fn notify(&self, notice: Notice);
}

impl<N: Notifier + ?Sized> Notifier for Arc<N> {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

impl<N: Notifier + ?Sized> Notifier for &N {
    fn notify(&self, notice: Notice) {
        (**self).notify(notice);
    }
}

/// Notifier that buffers notices until the host drains and displays them.
///
/// Share it between widgets with an [`Arc`].
#[derive(Debug, Default)]
pub struct NoticeQueue {
    pending: Mutex<Vec<Notice>>,
    dismiss_after: Option<Duration>,
}

impl NoticeQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue that stamps every notice with the given dismiss delay.
    #[must_use]
    pub fn with_dismiss_after(dismiss_after: Duration) -> Self {
        Self {
            pending: Mutex::default(),
            dismiss_after: Some(dismiss_after),
        }
    }

    /// Take every queued notice, oldest first.
    #[must_use]
    pub fn drain(&self) -> Vec<Notice> {
        let mut pending = self.pending.lock().unwrap_or_else(PoisonError::into_inner);
        std::mem::take(&mut *pending)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.pending.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Notifier for NoticeQueue {
    fn notify(&self, notice: Notice) {
        let notice = match self.dismiss_after {
            Some(after) => notice.dismiss_after(after),
            None => notice,
        };
        self.pending
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(notice);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drain_empties_queue_in_order() {
        let queue = NoticeQueue::new();
        queue.notify(Notice::warning("first"));
        queue.notify(Notice::success("second"));

        let drained = queue.drain();
        assert_eq!(drained.len(), 2);
        assert_eq!(drained[0].severity, Severity::Warning);
        assert_eq!(drained[1].message, "second");
        assert!(queue.is_empty());
    }

    #[test]
    fn test_queue_stamps_dismiss_delay() {
        let queue = NoticeQueue::with_dismiss_after(Duration::from_millis(1500));
        queue.notify(Notice::info("hello"));
        assert_eq!(queue.drain()[0].dismiss_after_ms(), 1500);
    }

    #[test]
    fn test_shared_through_arc() {
        let queue = Arc::new(NoticeQueue::new());
        let shared: Arc<dyn Notifier + Send + Sync> = queue.clone();
        shared.notify(Notice::error("boom"));
        assert_eq!(queue.len(), 1);
    }

    #[test]
    fn test_default_dismiss_is_three_seconds() {
        assert_eq!(Notice::info("x").dismiss_after_ms(), 3000);
    }
}
