//! To-do entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, json};

use super::record::{Draft, FromRow, InsertPosition, Patch, Record, Row, decode_row, require_label};
use super::ItemId;
use crate::domain::errors::{MappingError, ValidationError};
use crate::domain::ports::{Collection, Direction, Query};
use crate::domain::serde_utils::{id_string, null_as_default};

/// How pressing a task is.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    /// Can wait.
    #[default]
    Light,
    /// Should happen soon.
    Medium,
    /// Needs attention now.
    Urgent,
}

impl Urgency {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::Urgent => "urgent",
        }
    }
}

impl std::fmt::Display for Urgency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Urgency {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "urgent" => Ok(Self::Urgent),
            other => Err(ValidationError::invalid(
                "urgency",
                format!("expected light, medium or urgent, got {other:?}"),
            )),
        }
    }
}

/// Row shape of the `todos` table.
#[derive(Debug, Deserialize)]
pub(crate) struct TodoRow {
    #[serde(with = "id_string")]
    pub id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub urgency: Urgency,
    #[serde(default, deserialize_with = "null_as_default")]
    pub completed: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub completed_at: Option<DateTime<Utc>>,
}

/// A single task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoRecord {
    /// Task label.
    pub title: String,
    /// Priority tier.
    pub urgency: Urgency,
    /// Whether the task is done.
    pub completed: bool,
    /// When the task was created.
    pub created_at: DateTime<Utc>,
    /// When the task was completed, if it is.
    pub completed_at: Option<DateTime<Utc>>,
}

impl FromRow for TodoRecord {
    const COLLECTION: Collection = Collection::Todos;

    fn from_row(row: Row) -> Result<(ItemId, Self), MappingError> {
        let row: TodoRow = decode_row(Self::COLLECTION, row)?;
        Ok((
            ItemId::new(row.id),
            Self {
                title: row.title,
                urgency: row.urgency,
                completed: row.completed,
                created_at: row.created_at,
                completed_at: row.completed_at,
            },
        ))
    }
}

impl Record for TodoRecord {
    type Draft = TodoDraft;
    type Patch = TodoPatch;

    const INSERT_AT: InsertPosition = InsertPosition::Head;
    const NOUN: &'static str = "task";

    fn load_query() -> Query {
        Query::new().order_by("created_at", Direction::Desc)
    }
}

/// Fields of a new task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoDraft {
    /// Task label.
    pub title: String,
    /// Priority tier.
    pub urgency: Urgency,
}

impl TodoDraft {
    /// Creates a draft.
    #[must_use]
    pub fn new(title: impl Into<String>, urgency: Urgency) -> Self {
        Self {
            title: title.into(),
            urgency,
        }
    }
}

impl Draft<TodoRecord> for TodoDraft {
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            title: require_label("title", &self.title)?,
            urgency: self.urgency,
        })
    }

    fn provisional(&self) -> TodoRecord {
        TodoRecord {
            title: self.title.clone(),
            urgency: self.urgency,
            completed: false,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn to_row(&self) -> Row {
        json!({ "title": self.title, "urgency": self.urgency })
    }
}

/// Change to a task. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TodoPatch {
    /// New label.
    pub title: Option<String>,
    /// New priority tier.
    pub urgency: Option<Urgency>,
    /// New completion flag.
    pub completed: Option<bool>,
    /// New completion timestamp; `Some(None)` clears it.
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl TodoPatch {
    /// Marks the task done or not done, stamping or clearing the completion time.
    #[must_use]
    pub fn completion(completed: bool, now: DateTime<Utc>) -> Self {
        Self {
            completed: Some(completed),
            completed_at: Some(completed.then_some(now)),
            ..Self::default()
        }
    }

    /// Renames the task.
    #[must_use]
    pub fn rename(title: impl Into<String>) -> Self {
        Self {
            title: Some(title.into()),
            ..Self::default()
        }
    }
}

impl Patch<TodoRecord> for TodoPatch {
    fn validate(self) -> Result<Self, ValidationError> {
        let title = match self.title {
            Some(title) => Some(require_label("title", &title)?),
            None => None,
        };
        Ok(Self { title, ..self })
    }

    fn apply(&self, record: &mut TodoRecord) -> Self {
        let mut inverse = Self::default();
        if let Some(title) = &self.title {
            inverse.title = Some(std::mem::replace(&mut record.title, title.clone()));
        }
        if let Some(urgency) = self.urgency {
            inverse.urgency = Some(std::mem::replace(&mut record.urgency, urgency));
        }
        if let Some(completed) = self.completed {
            inverse.completed = Some(std::mem::replace(&mut record.completed, completed));
        }
        if let Some(completed_at) = self.completed_at {
            inverse.completed_at = Some(std::mem::replace(&mut record.completed_at, completed_at));
        }
        inverse
    }

    fn to_row(&self) -> Row {
        let mut row = Map::new();
        if let Some(title) = &self.title {
            row.insert("title".into(), json!(title));
        }
        if let Some(urgency) = self.urgency {
            row.insert("urgency".into(), json!(urgency));
        }
        if let Some(completed) = self.completed {
            row.insert("completed".into(), json!(completed));
        }
        if let Some(completed_at) = self.completed_at {
            row.insert("completed_at".into(), json!(completed_at));
        }
        Row::Object(row)
    }
}
