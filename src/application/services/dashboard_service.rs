//! Dashboard statistics derived from habits, habit logs and tasks.

use std::sync::Arc;

use chrono::{Days, NaiveDate};
use tracing::{debug, warn};

use crate::domain::entities::{FromRow, HabitLogRecord, HabitRecord, Row, TodoRecord};
use crate::domain::errors::StoreError;
use crate::domain::ports::{Collection, Query, RemoteStorePort};

/// Days covered by the weekly chart, today included.
pub const WEEK_DAYS: u64 = 7;

/// Habit completion for the current day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DailyReport {
    pub completed: usize,
    pub total: usize,
    /// Rounded share of completed habits, 0 without habits.
    pub percent: u8,
}

/// Completions on one day of the weekly chart.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DayPerformance {
    pub date: NaiveDate,
    pub habits: usize,
    pub tasks: usize,
}

impl DayPerformance {
    /// Short weekday name, e.g. `Mon`.
    #[must_use]
    pub fn weekday_label(&self) -> String {
        self.date.format("%a").to_string()
    }
}

/// Summarizes today's habit progress.
#[must_use]
pub fn daily_report<'a>(habits: impl IntoIterator<Item = &'a HabitRecord>) -> DailyReport {
    let (completed, total) = habits
        .into_iter()
        .fold((0, 0), |(completed, total), habit| {
            (completed + usize::from(habit.is_completed()), total + 1)
        });
    let percent = if total == 0 {
        0
    } else {
        // Rounds half up.
        u8::try_from((completed * 200 + total) / (total * 2)).unwrap_or(100)
    };
    DailyReport {
        completed,
        total,
        percent,
    }
}

/// Buckets habit logs and completed tasks into the seven days ending `today`.
#[must_use]
pub fn weekly_performance(
    today: NaiveDate,
    logs: &[HabitLogRecord],
    todos: &[TodoRecord],
) -> Vec<DayPerformance> {
    let start = week_start(today);
    let mut days: Vec<DayPerformance> = start
        .iter_days()
        .take_while(|date| *date <= today)
        .map(|date| DayPerformance {
            date,
            habits: 0,
            tasks: 0,
        })
        .collect();

    let bucket = |date: NaiveDate| usize::try_from((date - start).num_days()).ok();

    for log in logs {
        if let Some(day) = bucket(log.completed_on).and_then(|i| days.get_mut(i)) {
            day.habits += 1;
        }
    }
    for todo in todos.iter().filter(|todo| todo.completed) {
        let index = todo.completed_at.and_then(|at| bucket(at.date_naive()));
        if let Some(day) = index.and_then(|i| days.get_mut(i)) {
            day.tasks += 1;
        }
    }
    days
}

fn week_start(today: NaiveDate) -> NaiveDate {
    today
        .checked_sub_days(Days::new(WEEK_DAYS - 1))
        .unwrap_or(NaiveDate::MIN)
}

/// Fetches the rows behind the dashboard widgets.
#[derive(Clone)]
pub struct DashboardService {
    store: Arc<dyn RemoteStorePort>,
}

impl DashboardService {
    #[must_use]
    pub fn new(store: Arc<dyn RemoteStorePort>) -> Self {
        Self { store }
    }

    /// Loads all habits and summarizes them.
    ///
    /// # Errors
    /// Returns `StoreError` if the habits cannot be listed.
    pub async fn daily_report(&self) -> Result<DailyReport, StoreError> {
        let rows = self.store.list(Collection::Habits, &Query::new()).await?;
        let habits: Vec<HabitRecord> = decode_all(rows);
        Ok(daily_report(&habits))
    }

    /// Loads the week's habit logs and completed tasks concurrently and buckets them.
    ///
    /// # Errors
    /// Returns `StoreError` if either list call fails.
    pub async fn weekly_performance(
        &self,
        today: NaiveDate,
    ) -> Result<Vec<DayPerformance>, StoreError> {
        let start = week_start(today);
        let logs_query = Query::new()
            .gte("completed_at", start)
            .lte("completed_at", today);
        let todos_query = Query::new()
            .eq("completed", true)
            .gte("completed_at", format!("{start}T00:00:00"))
            .lte("completed_at", format!("{today}T23:59:59"));
        debug!(%start, %today, "Loading weekly performance");

        let (log_rows, todo_rows) = tokio::try_join!(
            self.store.list(Collection::HabitLogs, &logs_query),
            self.store.list(Collection::Todos, &todos_query),
        )?;

        let logs: Vec<HabitLogRecord> = decode_all(log_rows);
        let todos: Vec<TodoRecord> = decode_all(todo_rows);
        Ok(weekly_performance(today, &logs, &todos))
    }
}

fn decode_all<R: FromRow>(rows: Vec<Row>) -> Vec<R> {
    rows.into_iter()
        .filter_map(|row| match R::from_row(row) {
            Ok((_, record)) => Some(record),
            Err(e) => {
                warn!(collection = %R::COLLECTION, error = %e, "Skipping malformed row");
                None
            }
        })
        .collect()
}
