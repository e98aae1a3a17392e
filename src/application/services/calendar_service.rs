//! Calendar windows and day grouping.

use std::collections::BTreeMap;

use chrono::{DateTime, Days, Months, NaiveDate, NaiveTime, TimeDelta, Utc};

use crate::domain::entities::{PlanRecord, Tracked};
use crate::domain::errors::ValidationError;
use crate::domain::ports::{Direction, Query};

/// Inclusive time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

impl TimeWindow {
    /// Query listing plans starting inside the window, earliest first.
    #[must_use]
    pub fn plan_query(&self) -> Query {
        Query::new()
            .gte("start_time", self.start.to_rfc3339())
            .lte("start_time", self.end.to_rfc3339())
            .order_by("start_time", Direction::Asc)
    }

    #[must_use]
    pub fn contains(&self, at: DateTime<Utc>) -> bool {
        self.start <= at && at <= self.end
    }
}

/// First instant to last second of a calendar month.
///
/// # Errors
/// Returns `ValidationError::InvalidValue` for a month outside 1..=12.
pub fn month_window(year: i32, month: u32) -> Result<TimeWindow, ValidationError> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)
        .ok_or_else(|| ValidationError::invalid("month", format!("{year}-{month:02} is not a month")))?;
    let last = first
        .checked_add_months(Months::new(1))
        .and_then(|next| next.checked_sub_days(Days::new(1)))
        .ok_or_else(|| ValidationError::invalid("month", "out of range"))?;
    Ok(TimeWindow {
        start: start_of(first),
        end: end_of(last),
    })
}

/// First instant to last second of one day.
#[must_use]
pub fn day_window(date: NaiveDate) -> TimeWindow {
    TimeWindow {
        start: start_of(date),
        end: end_of(date),
    }
}

/// Groups plans by start date, each day in start order.
#[must_use]
pub fn group_by_day<'a>(
    plans: impl IntoIterator<Item = &'a Tracked<PlanRecord>>,
) -> BTreeMap<NaiveDate, Vec<&'a Tracked<PlanRecord>>> {
    let mut days: BTreeMap<NaiveDate, Vec<_>> = BTreeMap::new();
    for plan in plans {
        days.entry(plan.record().start_time.date_naive())
            .or_default()
            .push(plan);
    }
    for plans in days.values_mut() {
        plans.sort_by_key(|plan| plan.record().start_time);
    }
    days
}

fn start_of(date: NaiveDate) -> DateTime<Utc> {
    date.and_time(NaiveTime::MIN).and_utc()
}

fn end_of(date: NaiveDate) -> DateTime<Utc> {
    start_of(date) + TimeDelta::days(1) - TimeDelta::seconds(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{ItemId, PlanCategory};
    use chrono::TimeZone;
    use test_case::test_case;

    fn plan(id: &str, day: u32, hour: u32) -> Tracked<PlanRecord> {
        let start = Utc.with_ymd_and_hms(2026, 10, day, hour, 0, 0).unwrap();
        Tracked::Confirmed {
            id: ItemId::from(id),
            record: PlanRecord {
                title: id.to_string(),
                start_time: start,
                end_time: start + TimeDelta::hours(1),
                category: PlanCategory::Medium,
            },
        }
    }

    #[test_case(2026, 2, 28 ; "february")]
    #[test_case(2028, 2, 29 ; "leap_february")]
    #[test_case(2026, 12, 31 ; "december")]
    fn test_month_window_covers_whole_month(year: i32, month: u32, last_day: u32) {
        let window = month_window(year, month).unwrap();
        assert_eq!(window.start, Utc.with_ymd_and_hms(year, month, 1, 0, 0, 0).unwrap());
        assert_eq!(
            window.end,
            Utc.with_ymd_and_hms(year, month, last_day, 23, 59, 59).unwrap()
        );
    }

    #[test]
    fn test_month_window_rejects_bad_month() {
        assert!(month_window(2026, 13).is_err());
    }

    #[test]
    fn test_plan_query_filters_start_time() {
        let query = day_window(NaiveDate::from_ymd_opt(2026, 10, 18).unwrap()).plan_query();
        assert_eq!(query.filters.len(), 2);
        assert_eq!(query.filters[0].value, "2026-10-18T00:00:00+00:00");
        assert_eq!(query.filters[1].value, "2026-10-18T23:59:59+00:00");
    }

    #[test]
    fn test_group_by_day_sorts_within_day() {
        let plans = [plan("late", 18, 15), plan("other", 19, 8), plan("early", 18, 9)];
        let days = group_by_day(&plans);

        let day = NaiveDate::from_ymd_opt(2026, 10, 18).unwrap();
        let titles: Vec<_> = days[&day].iter().map(|p| p.record().title.as_str()).collect();
        assert_eq!(titles, ["early", "late"]);
        assert_eq!(days.len(), 2);
    }
}
