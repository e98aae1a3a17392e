//! Vision board images.

use std::sync::Arc;

use crate::application::reconciler::{ItemCollection, Reconciler, Reconciliation};
use crate::domain::entities::{ItemId, TempId, VisionDraft, VisionItem};
use crate::domain::errors::ReconcileError;
use crate::domain::ports::{NotificationPort, RemoteStorePort};

/// Images ordered by board position.
pub struct VisionBoard {
    reconciler: Reconciler<VisionItem>,
}

impl VisionBoard {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStorePort>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self {
            reconciler: Reconciler::new(store, notifier),
        }
    }

    pub fn load(&mut self) {
        self.reconciler.load();
    }

    /// Pins an image after the last one.
    ///
    /// # Errors
    /// Returns `ReconcileError::Validation` when the url is blank or not http(s).
    pub fn add(
        &mut self,
        image_url: impl Into<String>,
        caption: impl Into<String>,
    ) -> Result<TempId, ReconcileError> {
        let position = i32::try_from(self.items().len()).unwrap_or(i32::MAX);
        self.reconciler.create(VisionDraft {
            image_url: image_url.into(),
            caption: caption.into(),
            position,
        })
    }

    /// # Errors
    /// Returns `ReconcileError` when the image is unknown or busy.
    pub fn remove(&mut self, id: &ItemId) -> Result<(), ReconcileError> {
        self.reconciler.delete(id)
    }

    #[must_use]
    pub const fn items(&self) -> &ItemCollection<VisionItem> {
        self.reconciler.items()
    }

    pub async fn settle_all(&mut self) -> Vec<Reconciliation> {
        self.reconciler.settle_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ports::Collection;
    use crate::domain::ports::mocks::{MockNotificationPort, MockRemoteStore};
    use serde_json::json;
    use tokio_test::assert_ok;

    #[tokio::test]
    async fn test_add_uses_next_position() {
        let store = Arc::new(MockRemoteStore::new().with_rows(
            Collection::VisionBoard,
            vec![json!({"id": 1, "image_url": "https://img.test/a.png", "caption": null, "position": 0})],
        ));
        let mut board = VisionBoard::new(store.clone(), Arc::new(MockNotificationPort::new()));
        board.load();
        board.settle_all().await;

        assert_ok!(board.add("https://img.test/b.png", " Summit "));
        board.settle_all().await;

        let stored = &store.rows(Collection::VisionBoard)[1];
        assert_eq!(stored["position"], json!(1));
        assert_eq!(stored["caption"], json!("Summit"));
        assert_eq!(board.items().len(), 2);
    }

    #[tokio::test]
    async fn test_rejects_non_http_url() {
        let store = Arc::new(MockRemoteStore::new());
        let mut board = VisionBoard::new(store.clone(), Arc::new(MockNotificationPort::new()));

        assert!(board.add("ftp://img.test/a.png", "").is_err());
        assert!(store.calls().is_empty());
    }
}
