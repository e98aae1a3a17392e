//! Kanban projection of the `todos` table.

use chrono::{DateTime, Utc};
use serde_json::json;

use super::record::{Draft, FromRow, InsertPosition, Patch, Record, Row, decode_row};
use super::todo::{TodoDraft, TodoRow, Urgency};
use super::ItemId;
use crate::domain::errors::{MappingError, ValidationError};
use crate::domain::ports::{Collection, Direction, Query};

/// Board columns, left to right.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoardColumn {
    /// Not started.
    Todo,
    /// Being worked on. Only exists locally; the store keeps a completion flag.
    InProgress,
    /// Finished.
    Done,
}

impl BoardColumn {
    /// All columns in display order.
    pub const ALL: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    /// Column title.
    #[must_use]
    pub const fn title(self) -> &'static str {
        match self {
            Self::Todo => "To Do",
            Self::InProgress => "In Progress",
            Self::Done => "Completed",
        }
    }

    /// Completion flag persisted for cards in this column.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done)
    }

    /// Column a persisted card lands in after a load.
    #[must_use]
    pub const fn from_completed(completed: bool) -> Self {
        if completed { Self::Done } else { Self::Todo }
    }
}

impl std::fmt::Display for BoardColumn {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.title())
    }
}

impl std::str::FromStr for BoardColumn {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "todo" | "to-do" => Ok(Self::Todo),
            "progress" | "in-progress" | "doing" => Ok(Self::InProgress),
            "done" | "completed" => Ok(Self::Done),
            other => Err(ValidationError::invalid(
                "column",
                format!("expected todo, progress or done, got {other:?}"),
            )),
        }
    }
}

/// A task as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BoardCard {
    /// Task label.
    pub title: String,
    /// Priority tier.
    pub urgency: Urgency,
    /// Current column.
    pub column: BoardColumn,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
}

impl FromRow for BoardCard {
    const COLLECTION: Collection = Collection::Todos;

    fn from_row(row: Row) -> Result<(ItemId, Self), MappingError> {
        let row: TodoRow = decode_row(Self::COLLECTION, row)?;
        Ok((
            ItemId::new(row.id),
            Self {
                title: row.title,
                urgency: row.urgency,
                column: BoardColumn::from_completed(row.completed),
                created_at: row.created_at,
            },
        ))
    }
}

impl Record for BoardCard {
    type Draft = TodoDraft;
    type Patch = ColumnChange;

    const INSERT_AT: InsertPosition = InsertPosition::Head;
    const NOUN: &'static str = "task";

    fn load_query() -> Query {
        Query::new().order_by("created_at", Direction::Desc)
    }
}

impl Draft<BoardCard> for TodoDraft {
    fn validate(self) -> Result<Self, ValidationError> {
        <Self as Draft<super::TodoRecord>>::validate(self)
    }

    fn provisional(&self) -> BoardCard {
        BoardCard {
            title: self.title.clone(),
            urgency: self.urgency,
            column: BoardColumn::Todo,
            created_at: Utc::now(),
        }
    }

    fn to_row(&self) -> Row {
        <Self as Draft<super::TodoRecord>>::to_row(self)
    }
}

/// Moves a card to another column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnChange {
    /// Destination column.
    pub column: BoardColumn,
    /// Completion time written when the destination is terminal.
    pub at: DateTime<Utc>,
}

impl ColumnChange {
    /// Creates a column change stamped at `at`.
    #[must_use]
    pub const fn new(column: BoardColumn, at: DateTime<Utc>) -> Self {
        Self { column, at }
    }
}

impl Patch<BoardCard> for ColumnChange {
    fn apply(&self, record: &mut BoardCard) -> Self {
        let previous = std::mem::replace(&mut record.column, self.column);
        Self::new(previous, self.at)
    }

    fn to_row(&self) -> Row {
        let completed = self.column.is_terminal();
        json!({
            "completed": completed,
            "completed_at": completed.then_some(self.at),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(BoardColumn::Todo, false ; "todo_is_open")]
    #[test_case(BoardColumn::InProgress, false ; "progress_is_open")]
    #[test_case(BoardColumn::Done, true ; "done_is_completed")]
    fn test_column_change_derives_completion(column: BoardColumn, completed: bool) {
        let row = ColumnChange::new(column, Utc::now()).to_row();
        assert_eq!(row["completed"], json!(completed));
        assert_eq!(row["completed_at"].is_null(), !completed);
    }

    #[test]
    fn test_load_maps_completion_to_column() {
        let (_, card) = BoardCard::from_row(json!({
            "id": 9,
            "title": "Ship",
            "completed": true,
            "created_at": "2026-10-01T08:00:00Z"
        }))
        .unwrap();
        assert_eq!(card.column, BoardColumn::Done);
    }

    #[test]
    fn test_column_change_inverse() {
        let mut card = BoardCard {
            title: "Ship".into(),
            urgency: Urgency::Urgent,
            column: BoardColumn::Todo,
            created_at: Utc::now(),
        };
        let inverse = ColumnChange::new(BoardColumn::Done, Utc::now()).apply(&mut card);
        assert_eq!(card.column, BoardColumn::Done);
        assert_eq!(inverse.column, BoardColumn::Todo);
    }

    #[test_case("todo", BoardColumn::Todo ; "todo")]
    #[test_case("progress", BoardColumn::InProgress ; "progress")]
    #[test_case("Done", BoardColumn::Done ; "done")]
    fn test_column_parse(input: &str, expected: BoardColumn) {
        assert_eq!(input.parse::<BoardColumn>().unwrap(), expected);
    }
}
