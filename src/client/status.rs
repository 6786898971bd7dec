use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::runtime::Handle;
use tokio::time::{Instant, sleep_until};

/// How long a status message stays visible.
pub const CLEAR_AFTER: Duration = Duration::from_millis(3000);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub message: String,
    pub severity: Severity,
}

#[derive(Debug)]
struct Banner {
    message: String,
    severity: Severity,
}

/// Transient feedback line. Every `show` schedules its own clear, so an older
/// timer can blank a newer message before its three seconds are up.
#[derive(Debug, Clone)]
pub struct StatusBanner {
    inner: Arc<Mutex<Banner>>,
}

impl Default for StatusBanner {
    fn default() -> Self {
        Self {
            inner: Arc::new(Mutex::new(Banner {
                message: String::new(),
                severity: Severity::Success,
            })),
        }
    }
}

impl StatusBanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the message and schedules it to clear. Outside a tokio runtime the
    /// message stays until the next `show`.
    pub fn show(&self, message: impl Into<String>, severity: Severity) {
        let message = message.into();
        match severity {
            Severity::Success => tracing::info!("{}", message),
            Severity::Error => tracing::warn!("{}", message),
        }

        {
            let mut banner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
            banner.message = message;
            banner.severity = severity;
        }

        let Ok(runtime) = Handle::try_current() else {
            tracing::debug!("No tokio runtime, status message will not clear itself");
            return;
        };

        let deadline = Instant::now() + CLEAR_AFTER;
        let inner = Arc::clone(&self.inner);
        runtime.spawn(async move {
            sleep_until(deadline).await;
            inner
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .message
                .clear();
        });
    }

    pub fn success(&self, message: impl Into<String>) {
        self.show(message, Severity::Success);
    }

    pub fn error(&self, message: impl Into<String>) {
        self.show(message, Severity::Error);
    }

    /// The visible message, if any.
    pub fn current(&self) -> Option<StatusMessage> {
        let banner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        (!banner.message.is_empty()).then(|| StatusMessage {
            message: banner.message.clone(),
            severity: banner.severity,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::advance;

    async fn settle() {
        for _ in 0..4 {
            tokio::task::yield_now().await;
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_message_clears_after_three_seconds() {
        let banner = StatusBanner::new();
        banner.success("Upload complete");

        advance(Duration::from_millis(2999)).await;
        settle().await;
        assert_eq!(
            banner.current(),
            Some(StatusMessage {
                message: "Upload complete".to_string(),
                severity: Severity::Success,
            })
        );

        advance(Duration::from_millis(1)).await;
        settle().await;
        assert_eq!(banner.current(), None);
    }

    #[tokio::test(start_paused = true)]
    async fn test_later_message_overwrites_and_earlier_timer_still_fires() {
        let banner = StatusBanner::new();
        banner.error("first");

        advance(Duration::from_millis(2000)).await;
        settle().await;
        banner.success("second");
        assert_eq!(banner.current().unwrap().message, "second");

        // the first message's timer expires at 3000ms and blanks the second one
        advance(Duration::from_millis(1000)).await;
        settle().await;
        assert_eq!(banner.current(), None);
    }

    #[test]
    fn test_show_without_runtime_keeps_message() {
        let banner = StatusBanner::new();
        banner.error("offline");

        assert_eq!(
            banner.current(),
            Some(StatusMessage {
                message: "offline".to_string(),
                severity: Severity::Error,
            })
        );
    }
}
