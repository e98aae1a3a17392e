use std::collections::VecDeque;
use std::time::Duration;

use parking_lot::Mutex;
use tracing::debug;

use crate::domain::ports::NotificationPort;
use crate::domain::{Notification, NotificationKind};

/// Queue of timed notifications shown one after another.
#[derive(Debug)]
pub struct NotificationCenter {
    queue: Mutex<VecDeque<Notification>>,
    default_duration: Duration,
    enabled: bool,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new(Notification::DEFAULT_DURATION)
    }
}

impl NotificationCenter {
    #[must_use]
    pub fn new(default_duration: Duration) -> Self {
        Self {
            queue: Mutex::new(VecDeque::new()),
            default_duration,
            enabled: true,
        }
    }

    /// Creates a center that drops everything it is given.
    #[must_use]
    pub fn disabled() -> Self {
        Self {
            enabled: false,
            ..Self::default()
        }
    }

    pub fn success(&self, message: impl Into<String>) {
        self.push(NotificationKind::Success, message.into());
    }

    pub fn info(&self, message: impl Into<String>) {
        self.push(NotificationKind::Info, message.into());
    }

    pub fn error(&self, message: impl Into<String>) {
        self.push(NotificationKind::Error, message.into());
    }

    /// Marks the front notification as shown and drops it once expired.
    pub fn tick(&self) {
        let mut queue = self.queue.lock();
        if let Some(front) = queue.front_mut() {
            front.show();
            if front.is_expired() {
                queue.pop_front();
                if let Some(next) = queue.front_mut() {
                    next.show();
                }
            }
        }
    }

    #[must_use]
    pub fn current(&self) -> Option<Notification> {
        self.queue.lock().front().cloned()
    }

    #[must_use]
    pub fn has_notifications(&self) -> bool {
        !self.queue.lock().is_empty()
    }

    /// Takes every queued notification, oldest first.
    pub fn drain(&self) -> Vec<Notification> {
        self.queue.lock().drain(..).collect()
    }

    fn push(&self, kind: NotificationKind, message: String) {
        if !self.enabled {
            debug!(%kind, %message, "Notification suppressed");
            return;
        }
        let notification = Notification::new(kind, message).with_duration(self.default_duration);
        self.queue.lock().push_back(notification);
    }
}

impl NotificationPort for NotificationCenter {
    fn notify(&self, kind: NotificationKind, message: &str) {
        self.push(kind, message.to_string());
    }
}
