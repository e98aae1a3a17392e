//! Command line definition.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use clap::{Parser, Subcommand};

use crate::domain::entities::{BoardColumn, ItemId, PlanCategory, Urgency};
use crate::infrastructure::CliArgs;

#[derive(Debug, Parser)]
#[command(
    name = "discipline",
    version,
    about = "Tasks, habits, plans and goals from the terminal",
    long_about = None
)]
pub struct Cli {
    #[command(flatten)]
    pub args: CliArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Manage the to-do list.
    #[command(subcommand)]
    Todo(TodoCommand),
    /// Work with the kanban board.
    #[command(subcommand)]
    Board(BoardCommand),
    /// Track daily habits.
    #[command(subcommand)]
    Habit(HabitCommand),
    /// Plan the calendar.
    #[command(subcommand)]
    Plan(PlanCommand),
    /// Curate the vision board.
    #[command(subcommand)]
    Vision(VisionCommand),
    /// Show today's habit progress and the last seven days.
    Report,
}

#[derive(Debug, Subcommand)]
pub enum TodoCommand {
    /// List tasks, newest first.
    List,
    /// Add a task.
    Add {
        title: String,
        #[arg(short, long, default_value = "light")]
        urgency: Urgency,
    },
    /// Mark a task done, or open again with `--undo`.
    Toggle {
        id: ItemId,
        #[arg(long)]
        undo: bool,
    },
    /// Rename a task.
    Rename { id: ItemId, title: String },
    /// Delete a task.
    Rm { id: ItemId },
}

#[derive(Debug, Subcommand)]
pub enum BoardCommand {
    /// Show the three columns.
    Show,
    /// Add a card to `To Do`.
    Add {
        title: String,
        #[arg(short, long, default_value = "light")]
        urgency: Urgency,
    },
    /// Move a card to a column slot.
    Move {
        id: ItemId,
        /// `todo`, `progress` or `done`.
        column: BoardColumn,
        /// Slot within the column, 0 is the top.
        #[arg(short, long, default_value_t = 0)]
        index: usize,
    },
    /// Delete a card.
    Rm { id: ItemId },
}

#[derive(Debug, Subcommand)]
pub enum HabitCommand {
    /// List habits with today's progress.
    List,
    /// Add a one-tap habit.
    Add { name: String },
    /// Flip today's completion.
    Toggle { id: ItemId },
    /// Rename a habit.
    Rename { id: ItemId, name: String },
    /// Delete a habit.
    Rm { id: ItemId },
}

#[derive(Debug, Subcommand)]
pub enum PlanCommand {
    /// List plans of a month, or of one day with `--day`.
    List {
        /// Month as `YYYY-MM`, defaults to the current month.
        #[arg(long, value_parser = parse_month)]
        month: Option<(i32, u32)>,
        /// Only plans starting on this day (`YYYY-MM-DD`).
        #[arg(long, conflicts_with = "month")]
        day: Option<NaiveDate>,
    },
    /// Add a plan.
    Add {
        title: String,
        /// Start, `YYYY-MM-DD HH:MM` (UTC) or RFC 3339.
        #[arg(long, value_parser = parse_datetime)]
        start: DateTime<Utc>,
        /// End, same formats as `--start`.
        #[arg(long, value_parser = parse_datetime)]
        end: DateTime<Utc>,
        #[arg(short = 'k', long, default_value = "medium")]
        category: PlanCategory,
    },
    /// Change fields of a plan.
    Edit {
        id: ItemId,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, value_parser = parse_datetime)]
        start: Option<DateTime<Utc>>,
        #[arg(long, value_parser = parse_datetime)]
        end: Option<DateTime<Utc>>,
        #[arg(short = 'k', long)]
        category: Option<PlanCategory>,
    },
    /// Delete a plan.
    Rm { id: ItemId },
}

#[derive(Debug, Subcommand)]
pub enum VisionCommand {
    /// List board images.
    List,
    /// Pin an image.
    Add {
        url: String,
        #[arg(default_value = "")]
        caption: String,
    },
    /// Remove an image.
    Rm { id: ItemId },
}

fn parse_datetime(value: &str) -> Result<DateTime<Utc>, String> {
    if let Ok(at) = DateTime::parse_from_rfc3339(value) {
        return Ok(at.with_timezone(&Utc));
    }
    ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
        .map(|at| at.and_utc())
        .ok_or_else(|| format!("expected `YYYY-MM-DD HH:MM` or RFC 3339, got {value:?}"))
}

fn parse_month(value: &str) -> Result<(i32, u32), String> {
    let invalid = || format!("expected `YYYY-MM`, got {value:?}");
    let (year, month) = value.split_once('-').ok_or_else(invalid)?;
    let year = year.parse().map_err(|_| invalid())?;
    let month = month.parse().map_err(|_| invalid())?;
    if !(1..=12).contains(&month) {
        return Err(invalid());
    }
    Ok((year, month))
}
