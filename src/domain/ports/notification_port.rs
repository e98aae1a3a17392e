use crate::domain::NotificationKind;

/// Port for transient, non-blocking user notifications.
pub trait NotificationPort: Send + Sync {
    /// Shows a notification. Must not block.
    fn notify(&self, kind: NotificationKind, message: &str);
}

#[cfg(test)]
#[allow(dead_code)]
pub mod mock {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    pub struct MockNotificationPort {
        pub notifications: Arc<Mutex<Vec<(NotificationKind, String)>>>,
    }

    impl MockNotificationPort {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn messages(&self) -> Vec<(NotificationKind, String)> {
            self.notifications.lock().unwrap().clone()
        }

        pub fn last(&self) -> Option<(NotificationKind, String)> {
            self.notifications.lock().unwrap().last().cloned()
        }

        pub fn errors(&self) -> usize {
            self.notifications
                .lock()
                .unwrap()
                .iter()
                .filter(|(kind, _)| *kind == NotificationKind::Error)
                .count()
        }
    }

    impl NotificationPort for MockNotificationPort {
        fn notify(&self, kind: NotificationKind, message: &str) {
            self.notifications
                .lock()
                .unwrap()
                .push((kind, message.to_string()));
        }
    }
}
