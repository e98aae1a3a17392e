//! Habit and habit log entities.

use chrono::{DateTime, NaiveDate, Utc};
use serde::Deserialize;
use serde_json::{Map, json};

use super::record::{Draft, FromRow, InsertPosition, Patch, Record, Row, decode_row, require_label};
use super::ItemId;
use crate::domain::errors::{MappingError, ValidationError};
use crate::domain::ports::{Collection, Direction, Query};
use crate::domain::serde_utils::{id_string, null_as_default};

const BOOLEAN_KIND: &str = "boolean";

fn default_goal() -> i32 {
    1
}

fn default_kind() -> String {
    BOOLEAN_KIND.to_string()
}

#[derive(Debug, Deserialize)]
struct HabitRow {
    #[serde(with = "id_string")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    name: String,
    #[serde(default = "default_kind", rename = "type")]
    kind: String,
    #[serde(default)]
    goal_value: Option<i32>,
    #[serde(default, deserialize_with = "null_as_default")]
    current_value: i32,
    #[serde(default)]
    created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    completed_at: Option<DateTime<Utc>>,
}

/// A daily check-in habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitRecord {
    /// Habit label.
    pub name: String,
    /// Tracking type, `boolean` for one-tap habits.
    pub kind: String,
    /// Value counting as done for the day.
    pub goal_value: i32,
    /// Today's progress.
    pub current_value: i32,
    /// When the habit was created.
    pub created_at: Option<DateTime<Utc>>,
    /// When the habit was last completed.
    pub completed_at: Option<DateTime<Utc>>,
}

impl HabitRecord {
    /// Returns whether today's goal is met.
    #[must_use]
    pub fn is_completed(&self) -> bool {
        self.current_value >= self.goal_value.max(1)
    }
}

impl FromRow for HabitRecord {
    const COLLECTION: Collection = Collection::Habits;

    fn from_row(row: Row) -> Result<(ItemId, Self), MappingError> {
        let row: HabitRow = decode_row(Self::COLLECTION, row)?;
        Ok((
            ItemId::new(row.id),
            Self {
                name: row.name,
                kind: row.kind,
                goal_value: row.goal_value.filter(|goal| *goal > 0).unwrap_or_else(default_goal),
                current_value: row.current_value,
                created_at: row.created_at,
                completed_at: row.completed_at,
            },
        ))
    }
}

impl Record for HabitRecord {
    type Draft = HabitDraft;
    type Patch = HabitPatch;

    const INSERT_AT: InsertPosition = InsertPosition::Tail;
    const NOUN: &'static str = "habit";

    fn load_query() -> Query {
        Query::new().order_by("created_at", Direction::Asc)
    }
}

/// A new one-tap habit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitDraft {
    /// Habit label.
    pub name: String,
}

impl HabitDraft {
    /// Creates a draft.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Draft<HabitRecord> for HabitDraft {
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_label("habit name", &self.name)?,
        })
    }

    fn provisional(&self) -> HabitRecord {
        HabitRecord {
            name: self.name.clone(),
            kind: default_kind(),
            goal_value: default_goal(),
            current_value: 0,
            created_at: Some(Utc::now()),
            completed_at: None,
        }
    }

    fn to_row(&self) -> Row {
        json!({
            "name": self.name,
            "type": BOOLEAN_KIND,
            "goal_value": default_goal(),
            "current_value": 0,
        })
    }
}

/// Change to a habit. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HabitPatch {
    /// New label.
    pub name: Option<String>,
    /// New progress value.
    pub current_value: Option<i32>,
    /// New completion timestamp; `Some(None)` clears it.
    pub completed_at: Option<Option<DateTime<Utc>>>,
}

impl HabitPatch {
    /// Flips a habit between done and not done for the day.
    #[must_use]
    pub fn toggle(habit: &HabitRecord, now: DateTime<Utc>) -> Self {
        let completing = !habit.is_completed();
        Self {
            current_value: Some(if completing { habit.goal_value.max(1) } else { 0 }),
            completed_at: Some(completing.then_some(now)),
            name: None,
        }
    }

    /// Renames the habit.
    #[must_use]
    pub fn rename(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }
}

impl Patch<HabitRecord> for HabitPatch {
    fn validate(self) -> Result<Self, ValidationError> {
        let name = match self.name {
            Some(name) => Some(require_label("habit name", &name)?),
            None => None,
        };
        if self.current_value.is_some_and(|value| value < 0) {
            return Err(ValidationError::invalid("current value", "must not be negative"));
        }
        Ok(Self { name, ..self })
    }

    fn apply(&self, record: &mut HabitRecord) -> Self {
        let mut inverse = Self::default();
        if let Some(name) = &self.name {
            inverse.name = Some(std::mem::replace(&mut record.name, name.clone()));
        }
        if let Some(value) = self.current_value {
            inverse.current_value = Some(std::mem::replace(&mut record.current_value, value));
        }
        if let Some(completed_at) = self.completed_at {
            inverse.completed_at = Some(std::mem::replace(&mut record.completed_at, completed_at));
        }
        inverse
    }

    fn to_row(&self) -> Row {
        let mut row = Map::new();
        if let Some(name) = &self.name {
            row.insert("name".into(), json!(name));
        }
        if let Some(value) = self.current_value {
            row.insert("current_value".into(), json!(value));
        }
        if let Some(completed_at) = self.completed_at {
            row.insert("completed_at".into(), json!(completed_at));
        }
        Row::Object(row)
    }
}

#[derive(Debug, Deserialize)]
struct HabitLogRow {
    #[serde(with = "id_string")]
    id: String,
    #[serde(default, with = "option_id")]
    habit_id: Option<String>,
    completed_at: String,
}

mod option_id {
    use serde::{Deserialize, Deserializer};

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(transparent)]
        struct Id(#[serde(with = "crate::domain::serde_utils::id_string")] String);

        Ok(Option::<Id>::deserialize(deserializer)?.map(|Id(id)| id))
    }
}

/// One day on which a habit was completed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HabitLogRecord {
    /// Habit the entry belongs to.
    pub habit_id: Option<ItemId>,
    /// Completion day.
    pub completed_on: NaiveDate,
}

impl FromRow for HabitLogRecord {
    const COLLECTION: Collection = Collection::HabitLogs;

    fn from_row(row: Row) -> Result<(ItemId, Self), MappingError> {
        let row: HabitLogRow = decode_row(Self::COLLECTION, row)?;
        // Logs store a plain date, but tolerate full timestamps.
        let day = row.completed_at.get(..10).unwrap_or(&row.completed_at);
        let completed_on = NaiveDate::parse_from_str(day, "%Y-%m-%d")
            .map_err(|e| MappingError::new(Self::COLLECTION.table(), e.to_string()))?;
        Ok((
            ItemId::new(row.id),
            Self {
                habit_id: row.habit_id.map(ItemId::new),
                completed_on,
            },
        ))
    }
}
