//! Monthly calendar of plans.

use std::sync::Arc;

use chrono::NaiveDate;

use crate::application::reconciler::{ItemCollection, Reconciler, Reconciliation};
use crate::application::services::{day_window, month_window};
use crate::domain::entities::{ItemId, PlanDraft, PlanPatch, PlanRecord, TempId, Tracked};
use crate::domain::errors::{ReconcileError, ValidationError};
use crate::domain::ports::{NotificationPort, Query, RemoteStorePort};

/// Plans of the displayed month, earliest first.
pub struct PlanCalendar {
    reconciler: Reconciler<PlanRecord>,
}

impl PlanCalendar {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStorePort>, notifier: Arc<dyn NotificationPort>) -> Self {
        Self {
            reconciler: Reconciler::new(store, notifier),
        }
    }

    /// Loads the plans starting within a month.
    ///
    /// # Errors
    /// Returns `ValidationError` for a month outside 1..=12.
    pub fn load_month(&mut self, year: i32, month: u32) -> Result<(), ValidationError> {
        let window = month_window(year, month)?;
        self.reconciler.set_query(window.plan_query());
        self.reconciler.load();
        Ok(())
    }

    /// Loads a single plan by id, whatever month it falls in.
    pub fn load_plan(&mut self, id: &ItemId) {
        self.reconciler.set_query(Query::new().eq("id", id));
        self.reconciler.load();
    }

    /// # Errors
    /// Returns `ReconcileError::Validation` for a blank title or inverted range.
    pub fn add(&mut self, draft: PlanDraft) -> Result<TempId, ReconcileError> {
        self.reconciler.create(draft)
    }

    /// # Errors
    /// Returns `ReconcileError` when the plan is unknown, busy or the patch is invalid.
    pub fn edit(&mut self, id: &ItemId, patch: PlanPatch) -> Result<(), ReconcileError> {
        self.reconciler.update_with_notice(id, patch, "Plan updated")
    }

    /// # Errors
    /// Returns `ReconcileError` when the plan is unknown or busy.
    pub fn remove(&mut self, id: &ItemId) -> Result<(), ReconcileError> {
        self.reconciler.delete(id)
    }

    /// Plans starting on `date`, earliest first.
    #[must_use]
    pub fn plans_on(&self, date: NaiveDate) -> Vec<&Tracked<PlanRecord>> {
        let window = day_window(date);
        let mut plans: Vec<_> = self
            .items()
            .iter()
            .filter(|plan| window.contains(plan.record().start_time))
            .collect();
        plans.sort_by_key(|plan| plan.record().start_time);
        plans
    }

    #[must_use]
    pub const fn items(&self) -> &ItemCollection<PlanRecord> {
        self.reconciler.items()
    }

    pub async fn settle_all(&mut self) -> Vec<Reconciliation> {
        self.reconciler.settle_all().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::PlanCategory;
    use crate::domain::ports::mocks::{Call, MockNotificationPort, MockRemoteStore};
    use crate::domain::ports::{Collection, FilterOp};
    use chrono::{TimeDelta, TimeZone, Utc};
    use serde_json::json;
    use tokio_test::{assert_err, assert_ok};

    fn plan_row(id: &str, start: &str, end: &str) -> serde_json::Value {
        json!({"id": id, "title": id, "start_time": start, "end_time": end, "category": "high"})
    }

    #[tokio::test]
    async fn test_load_month_filters_by_start_time() {
        let store = Arc::new(MockRemoteStore::new());
        let mut calendar = PlanCalendar::new(store.clone(), Arc::new(MockNotificationPort::new()));

        assert_ok!(calendar.load_month(2026, 10));
        calendar.settle_all().await;

        let Some(Call::List(Collection::CalendarPlans, query)) = store.calls().pop() else {
            panic!("expected a list call");
        };
        let ops: Vec<_> = query.filters.iter().map(|f| (f.column.as_str(), f.op)).collect();
        assert_eq!(ops, [("start_time", FilterOp::Gte), ("start_time", FilterOp::Lte)]);
        assert_eq!(query.filters[1].value, "2026-10-31T23:59:59+00:00");
        assert!(calendar.load_month(2026, 0).is_err());
    }

    #[tokio::test]
    async fn test_load_plan_outside_current_month() {
        let store = Arc::new(MockRemoteStore::new().with_rows(
            Collection::CalendarPlans,
            vec![
                plan_row("p1", "2026-10-18T07:00:00Z", "2026-10-18T08:00:00Z"),
                plan_row("p9", "2099-05-03T09:00:00Z", "2099-05-03T10:00:00Z"),
            ],
        ));
        let mut calendar = PlanCalendar::new(store.clone(), Arc::new(MockNotificationPort::new()));
        let id = ItemId::from("p9");

        calendar.load_plan(&id);
        calendar.settle_all().await;

        assert_eq!(calendar.items().len(), 1);
        assert_ok!(calendar.remove(&id));
        calendar.settle_all().await;
        assert_eq!(store.rows(Collection::CalendarPlans).len(), 1);
        assert!(store.calls().contains(&Call::List(
            Collection::CalendarPlans,
            Query::new().eq("id", "p9")
        )));
    }

    #[tokio::test]
    async fn test_plans_on_day() {
        let store = Arc::new(MockRemoteStore::new().with_rows(
            Collection::CalendarPlans,
            vec![
                plan_row("late", "2026-10-18T17:00:00Z", "2026-10-18T18:00:00Z"),
                plan_row("next", "2026-10-19T08:00:00Z", "2026-10-19T09:00:00Z"),
                plan_row("early", "2026-10-18T07:00:00Z", "2026-10-18T08:00:00Z"),
            ],
        ));
        let mut calendar = PlanCalendar::new(store, Arc::new(MockNotificationPort::new()));
        assert_ok!(calendar.load_month(2026, 10));
        calendar.settle_all().await;

        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let titles: Vec<_> = calendar
            .plans_on(day)
            .iter()
            .map(|plan| plan.record().title.as_str())
            .collect();
        assert_eq!(titles, ["early", "late"]);
    }

    #[tokio::test]
    async fn test_add_and_edit() {
        let store = Arc::new(MockRemoteStore::new());
        let notifier = Arc::new(MockNotificationPort::new());
        let mut calendar = PlanCalendar::new(store.clone(), notifier.clone());
        let start = Utc.with_ymd_and_hms(2026, 10, 20, 9, 0, 0).unwrap();

        assert_ok!(calendar.add(PlanDraft {
            title: "Dentist".into(),
            start_time: start,
            end_time: start + TimeDelta::hours(1),
            category: PlanCategory::High,
        }));
        calendar.settle_all().await;

        let id = ItemId::from("srv-1");
        let patch = PlanPatch {
            start_time: Some(start + TimeDelta::hours(2)),
            end_time: Some(start + TimeDelta::hours(1)),
            ..PlanPatch::default()
        };
        assert_err!(calendar.edit(&id, patch));

        let patch = PlanPatch {
            title: Some("Dentist (moved)".into()),
            ..PlanPatch::default()
        };
        assert_ok!(calendar.edit(&id, patch));
        calendar.settle_all().await;

        assert_eq!(calendar.items().confirmed(&id).unwrap().title, "Dentist (moved)");
        assert_eq!(notifier.messages().len(), 3);
        assert_eq!(notifier.last().unwrap().1, "Plan updated");
    }
}
