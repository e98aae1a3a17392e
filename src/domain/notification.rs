use std::time::{Duration, Instant};

/// Tone of a transient notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Info,
    Error,
}

impl NotificationKind {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Short-lived message such as "Task added" or "Failed to delete habit".
///
/// The display clock starts when the message is first shown, not when it is queued,
/// so messages waiting behind others keep their full duration.
#[derive(Debug, Clone)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
    pub duration: Duration,
    pub shown_at: Option<Instant>,
}

impl Notification {
    pub const DEFAULT_DURATION: Duration = Duration::from_secs(4);

    #[must_use]
    pub fn new(kind: NotificationKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            duration: Self::DEFAULT_DURATION,
            shown_at: None,
        }
    }

    #[must_use]
    pub const fn with_duration(mut self, duration: Duration) -> Self {
        self.duration = duration;
        self
    }

    #[must_use]
    pub const fn is_error(&self) -> bool {
        matches!(self.kind, NotificationKind::Error)
    }

    /// Starts the display clock; later calls keep the first instant.
    pub fn show(&mut self) {
        self.shown_at.get_or_insert_with(Instant::now);
    }

    /// Display time left, `None` while not shown yet.
    #[must_use]
    pub fn remaining(&self) -> Option<Duration> {
        self.shown_at
            .map(|at| self.duration.saturating_sub(at.elapsed()))
    }

    #[must_use]
    pub fn is_expired(&self) -> bool {
        self.remaining().is_some_and(|left| left.is_zero())
    }
}
