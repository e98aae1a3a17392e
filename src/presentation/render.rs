//! Plain text rendering of views and notifications.

use std::fmt::Write;

use chrono::NaiveDate;

use crate::application::ItemCollection;
use crate::application::services::{DailyReport, DayPerformance, group_by_day};
use crate::domain::entities::{
    BoardCard, BoardColumn, HabitRecord, PlanRecord, TodoRecord, Tracked, VisionItem,
};
use crate::domain::Notification;

const BAR_WIDTH: usize = 20;

/// Id column: the durable id, or a marker while the create is in flight.
fn label<R>(item: &Tracked<R>) -> String {
    match item {
        Tracked::Confirmed { id, .. } => id.to_string(),
        Tracked::Provisional { .. } => "(saving)".to_string(),
    }
}

const fn check(done: bool) -> &'static str {
    if done { "[x]" } else { "[ ]" }
}

#[must_use]
pub fn todos(items: &ItemCollection<TodoRecord>) -> String {
    if items.is_empty() {
        return "No tasks yet.\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let todo = item.record();
        let _ = writeln!(
            out,
            "{} {:>8}  {}  ({})",
            check(todo.completed),
            label(item),
            todo.title,
            todo.urgency
        );
    }
    out
}

#[must_use]
pub fn board(items: &ItemCollection<BoardCard>) -> String {
    let mut out = String::new();
    for column in BoardColumn::ALL {
        let cards: Vec<_> = items
            .iter()
            .filter(|card| card.record().column == column)
            .collect();
        let _ = writeln!(out, "{} ({})", column.title(), cards.len());
        for card in cards {
            let _ = writeln!(
                out,
                "  {:>8}  {}  ({})",
                label(card),
                card.record().title,
                card.record().urgency
            );
        }
    }
    out
}

#[must_use]
pub fn habits(items: &ItemCollection<HabitRecord>, report: DailyReport) -> String {
    let mut out = String::new();
    for item in items {
        let habit = item.record();
        let _ = writeln!(
            out,
            "{} {:>8}  {}  {}/{}",
            check(habit.is_completed()),
            label(item),
            habit.name,
            habit.current_value,
            habit.goal_value
        );
    }
    out.push_str(&daily(report));
    out
}

#[must_use]
pub fn plans(items: &ItemCollection<PlanRecord>) -> String {
    let days = group_by_day(items);
    if days.is_empty() {
        return "No plans.\n".to_string();
    }
    let mut out = String::new();
    for (date, plans) in days {
        let _ = writeln!(out, "{}", date.format("%a %Y-%m-%d"));
        out.push_str(&plan_lines(plans));
    }
    out
}

#[must_use]
pub fn plans_on(date: NaiveDate, plans: Vec<&Tracked<PlanRecord>>) -> String {
    let mut out = format!("{}\n", date.format("%a %Y-%m-%d"));
    if plans.is_empty() {
        out.push_str("  Nothing planned.\n");
    } else {
        out.push_str(&plan_lines(plans));
    }
    out
}

fn plan_lines(plans: Vec<&Tracked<PlanRecord>>) -> String {
    let mut out = String::new();
    for item in plans {
        let plan = item.record();
        let _ = writeln!(
            out,
            "  {:>8}  {}-{}  {}  [{}]",
            label(item),
            plan.start_time.format("%H:%M"),
            plan.end_time.format("%H:%M"),
            plan.title,
            plan.category.label()
        );
    }
    out
}

#[must_use]
pub fn vision(items: &ItemCollection<VisionItem>) -> String {
    if items.is_empty() {
        return "Vision board is empty.\n".to_string();
    }
    let mut out = String::new();
    for item in items {
        let image = item.record();
        let _ = write!(out, "{:>8}  {}", label(item), image.image_url);
        if !image.caption.is_empty() {
            let _ = write!(out, "  \"{}\"", image.caption);
        }
        out.push('\n');
    }
    out
}

/// Today's progress line with a text bar.
#[must_use]
pub fn daily(report: DailyReport) -> String {
    let filled = usize::from(report.percent) * BAR_WIDTH / 100;
    format!(
        "Today: {}/{} habits [{}{}] {}%\n",
        report.completed,
        report.total,
        "#".repeat(filled),
        "-".repeat(BAR_WIDTH - filled),
        report.percent
    )
}

#[must_use]
pub fn weekly(days: &[DayPerformance]) -> String {
    let mut out = String::from("Last 7 days      habits  tasks\n");
    for day in days {
        let _ = writeln!(
            out,
            "{} {}  {:>6}  {:>5}",
            day.weekday_label(),
            day.date,
            day.habits,
            day.tasks
        );
    }
    out
}

#[must_use]
pub fn notifications(notifications: &[Notification]) -> String {
    notifications
        .iter()
        .map(|n| format!("[{}] {}\n", n.kind, n.message))
        .collect()
}
