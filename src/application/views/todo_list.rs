//! Plain to-do list.

use std::sync::Arc;

use chrono::Utc;

use crate::application::reconciler::{ItemCollection, Reconciler, Reconciliation};
use crate::domain::entities::{ItemId, TempId, TodoDraft, TodoPatch, TodoRecord, Urgency};
use crate::domain::errors::ReconcileError;
use crate::domain::ports::{NotificationPort, RemoteStorePort};

/// Tasks, newest first.
pub struct TodoList {
    reconciler: Reconciler<TodoRecord>,
}

impl TodoList {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStorePort>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self {
            reconciler: Reconciler::new(store, notifier),
        }
    }

    pub fn load(&mut self) {
        self.reconciler.load();
    }

    /// Adds a task at the top of the list.
    ///
    /// # Errors
    /// Returns `ReconcileError::Validation` for a blank title.
    pub fn add(&mut self, title: impl Into<String>, urgency: Urgency) -> Result<TempId, ReconcileError> {
        self.reconciler.create(TodoDraft::new(title, urgency))
    }

    /// Marks a task done or open, stamping or clearing its completion time.
    ///
    /// # Errors
    /// Returns `ReconcileError` when the task is unknown or busy.
    pub fn toggle(&mut self, id: &ItemId, completed: bool) -> Result<(), ReconcileError> {
        self.reconciler
            .update(id, TodoPatch::completion(completed, Utc::now()))
    }

    /// # Errors
    /// Returns `ReconcileError` when the task is unknown, busy or the title is blank.
    pub fn rename(&mut self, id: &ItemId, title: impl Into<String>) -> Result<(), ReconcileError> {
        self.reconciler.update(id, TodoPatch::rename(title))
    }

    /// # Errors
    /// Returns `ReconcileError` when the task is unknown or busy.
    pub fn remove(&mut self, id: &ItemId) -> Result<(), ReconcileError> {
        self.reconciler.delete(id)
    }

    #[must_use]
    pub const fn items(&self) -> &ItemCollection<TodoRecord> {
        self.reconciler.items()
    }

    pub async fn settle_all(&mut self) -> Vec<Reconciliation> {
        self.reconciler.settle_all().await
    }
}
