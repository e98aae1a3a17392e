//! Daily habits.

use std::sync::Arc;

use chrono::{NaiveDate, Utc};

use crate::application::reconciler::{ItemCollection, Reconciler, Reconciliation};
use crate::application::services::{DailyReport, daily_report};
use crate::domain::entities::{HabitDraft, HabitPatch, HabitRecord, ItemId, ItemKey, TempId};
use crate::domain::errors::ReconcileError;
use crate::domain::ports::{NotificationPort, RemoteStorePort};

/// Habits in creation order.
pub struct HabitList {
    reconciler: Reconciler<HabitRecord>,
    loaded_on: Option<NaiveDate>,
}

impl HabitList {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStorePort>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self {
            reconciler: Reconciler::new(store, notifier),
            loaded_on: None,
        }
    }

    pub fn load(&mut self) {
        self.loaded_on = Some(Utc::now().date_naive());
        self.reconciler.load();
    }

    /// Reloads once the calendar day has moved past the last load.
    ///
    /// The store resets daily progress at midnight; this picks the reset up.
    pub fn refresh_if_new_day(&mut self, today: NaiveDate) -> bool {
        if self.loaded_on == Some(today) {
            return false;
        }
        tracing::info!(%today, "Day changed, reloading habits");
        self.loaded_on = Some(today);
        self.reconciler.load();
        true
    }

    /// Adds a one-tap habit at the end of the list.
    ///
    /// # Errors
    /// Returns `ReconcileError::Validation` for a blank name.
    pub fn add(&mut self, name: impl Into<String>) -> Result<TempId, ReconcileError> {
        self.reconciler.create(HabitDraft::new(name))
    }

    /// Flips today's completion.
    ///
    /// # Errors
    /// Returns `ReconcileError` when the habit is unknown or busy.
    pub fn toggle(&mut self, id: &ItemId) -> Result<(), ReconcileError> {
        let patch = self
            .reconciler
            .items()
            .confirmed(id)
            .map(|habit| HabitPatch::toggle(habit, Utc::now()))
            .ok_or_else(|| ReconcileError::UnknownItem {
                key: ItemKey::Durable(id.clone()),
            })?;
        self.reconciler.update(id, patch)
    }

    /// # Errors
    /// Returns `ReconcileError` when the habit is unknown, busy or the name is blank.
    pub fn rename(&mut self, id: &ItemId, name: impl Into<String>) -> Result<(), ReconcileError> {
        self.reconciler
            .update_with_notice(id, HabitPatch::rename(name), "Habit renamed")
    }

    /// # Errors
    /// Returns `ReconcileError` when the habit is unknown or busy.
    pub fn remove(&mut self, id: &ItemId) -> Result<(), ReconcileError> {
        self.reconciler.delete(id)
    }

    /// Today's progress over the habits currently shown.
    #[must_use]
    pub fn report(&self) -> DailyReport {
        daily_report(self.items().iter().map(|habit| habit.record()))
    }

    #[must_use]
    pub const fn items(&self) -> &ItemCollection<HabitRecord> {
        self.reconciler.items()
    }

    pub async fn settle_all(&mut self) -> Vec<Reconciliation> {
        self.reconciler.settle_all().await
    }
}
