//! Three-column task board.

use std::sync::Arc;

use chrono::Utc;

use crate::application::reconciler::{ItemCollection, Reconciler, Reconciliation};
use crate::domain::entities::{
    BoardCard, BoardColumn, ColumnChange, ItemId, ItemKey, TempId, TodoDraft, Tracked, Urgency,
};
use crate::domain::errors::ReconcileError;
use crate::domain::ports::{NotificationPort, RemoteStorePort};

/// Tasks laid out in `To Do`, `In Progress` and `Completed` columns.
///
/// Only completion is stored, so `In Progress` placement lasts until the next load.
pub struct KanbanBoard {
    reconciler: Reconciler<BoardCard>,
}

impl KanbanBoard {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStorePort>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self {
            reconciler: Reconciler::new(store, notifier),
        }
    }

    pub fn load(&mut self) {
        self.reconciler.load();
    }

    /// Adds a card to the `To Do` column.
    ///
    /// # Errors
    /// Returns `ReconcileError::Validation` for a blank title.
    pub fn quick_add(
        &mut self,
        title: impl Into<String>,
        urgency: Urgency,
    ) -> Result<TempId, ReconcileError> {
        self.reconciler.create(TodoDraft::new(title, urgency))
    }

    /// Drops a card at `index` within `column`.
    ///
    /// Returns `false` without calling the store when the card is already there.
    ///
    /// # Errors
    /// Returns `ReconcileError` when the card is unknown or busy.
    pub fn move_card(
        &mut self,
        id: &ItemId,
        column: BoardColumn,
        index: usize,
    ) -> Result<bool, ReconcileError> {
        let key = ItemKey::Durable(id.clone());
        let current = self
            .reconciler
            .items()
            .confirmed(id)
            .map(|card| card.column)
            .ok_or_else(|| ReconcileError::UnknownItem { key: key.clone() })?;

        let position = self
            .column(current)
            .iter()
            .position(|card| card.has_key(&key));
        if current == column && position == Some(index) {
            return Ok(false);
        }

        let target = self.target_index(&key, column, index);
        self.reconciler
            .move_item(id, ColumnChange::new(column, Utc::now()), target)?;
        Ok(true)
    }

    /// # Errors
    /// Returns `ReconcileError` when the card is unknown or busy.
    pub fn remove(&mut self, id: &ItemId) -> Result<(), ReconcileError> {
        self.reconciler.delete(id)
    }

    /// Cards of one column in board order.
    #[must_use]
    pub fn column(&self, column: BoardColumn) -> Vec<&Tracked<BoardCard>> {
        self.reconciler
            .items()
            .iter()
            .filter(|card| card.record().column == column)
            .collect()
    }

    #[must_use]
    pub const fn items(&self) -> &ItemCollection<BoardCard> {
        self.reconciler.items()
    }

    pub async fn settle_all(&mut self) -> Vec<Reconciliation> {
        self.reconciler.settle_all().await
    }


    /// Maps a column slot to a collection index, counted without the moving card.
    fn target_index(&self, moving: &ItemKey, column: BoardColumn, index: usize) -> usize {
        let others: Vec<_> = self
            .reconciler
            .items()
            .iter()
            .filter(|card| !card.has_key(moving))
            .collect();
        let slots: Vec<usize> = others
            .iter()
            .enumerate()
            .filter(|(_, card)| card.record().column == column)
            .map(|(i, _)| i)
            .collect();

        match slots.get(index) {
            Some(slot) => *slot,
            None => slots.last().map_or(others.len(), |last| last + 1),
        }
    }
}
