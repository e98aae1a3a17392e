//! Calendar plan entity.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::{Map, json};

use super::record::{Draft, FromRow, InsertPosition, Patch, Record, Row, decode_row, require_label};
use super::ItemId;
use crate::domain::errors::{MappingError, ValidationError};
use crate::domain::ports::{Collection, Direction, Query};
use crate::domain::serde_utils::{id_string, null_as_default};

/// Urgency tier of a calendar plan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum PlanCategory {
    /// Light urgency.
    Light,
    /// Intermediate.
    #[default]
    Medium,
    /// Very urgent.
    High,
}

impl PlanCategory {
    /// Returns the wire value.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }

    /// Human readable label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Light => "Light Urgent",
            Self::Medium => "Intermediate",
            Self::High => "Very Urgent",
        }
    }

    /// Maps a stored value, falling back to `Medium` for legacy categories.
    #[must_use]
    pub fn from_stored(value: &str) -> Self {
        value.parse().unwrap_or_default()
    }
}

impl std::fmt::Display for PlanCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for PlanCategory {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "light" => Ok(Self::Light),
            "medium" => Ok(Self::Medium),
            "high" => Ok(Self::High),
            other => Err(ValidationError::invalid(
                "category",
                format!("expected light, medium or high, got {other:?}"),
            )),
        }
    }
}

impl serde::Serialize for PlanCategory {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for PlanCategory {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value: Option<String> = Option::deserialize(deserializer)?;
        Ok(value.as_deref().map(Self::from_stored).unwrap_or_default())
    }
}

#[derive(Debug, Deserialize)]
struct PlanRow {
    #[serde(with = "id_string")]
    id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    title: String,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    #[serde(default)]
    category: PlanCategory,
}

/// A scheduled block on the calendar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanRecord {
    /// Plan label.
    pub title: String,
    /// Start of the block.
    pub start_time: DateTime<Utc>,
    /// End of the block.
    pub end_time: DateTime<Utc>,
    /// Urgency tier.
    pub category: PlanCategory,
}

impl FromRow for PlanRecord {
    const COLLECTION: Collection = Collection::CalendarPlans;

    fn from_row(row: Row) -> Result<(ItemId, Self), MappingError> {
        let row: PlanRow = decode_row(Self::COLLECTION, row)?;
        Ok((
            ItemId::new(row.id),
            Self {
                title: row.title,
                start_time: row.start_time,
                end_time: row.end_time,
                category: row.category,
            },
        ))
    }
}

impl Record for PlanRecord {
    type Draft = PlanDraft;
    type Patch = PlanPatch;

    const INSERT_AT: InsertPosition = InsertPosition::Tail;
    const NOUN: &'static str = "plan";

    fn load_query() -> Query {
        Query::new().order_by("start_time", Direction::Asc)
    }
}

/// Fields of a new plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanDraft {
    /// Plan label.
    pub title: String,
    /// Start of the block.
    pub start_time: DateTime<Utc>,
    /// End of the block.
    pub end_time: DateTime<Utc>,
    /// Urgency tier.
    pub category: PlanCategory,
}

impl Draft<PlanRecord> for PlanDraft {
    fn validate(self) -> Result<Self, ValidationError> {
        if self.end_time < self.start_time {
            return Err(ValidationError::InvalidTimeRange);
        }
        Ok(Self {
            title: require_label("title", &self.title)?,
            ..self
        })
    }

    fn provisional(&self) -> PlanRecord {
        PlanRecord {
            title: self.title.clone(),
            start_time: self.start_time,
            end_time: self.end_time,
            category: self.category,
        }
    }

    fn to_row(&self) -> Row {
        json!({
            "title": self.title,
            "start_time": self.start_time,
            "end_time": self.end_time,
            "category": self.category,
        })
    }
}

/// Change to a plan. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlanPatch {
    /// New label.
    pub title: Option<String>,
    /// New urgency tier.
    pub category: Option<PlanCategory>,
    /// New start.
    pub start_time: Option<DateTime<Utc>>,
    /// New end.
    pub end_time: Option<DateTime<Utc>>,
}

impl Patch<PlanRecord> for PlanPatch {
    fn validate(self) -> Result<Self, ValidationError> {
        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end < start {
                return Err(ValidationError::InvalidTimeRange);
            }
        }
        let title = match self.title {
            Some(title) => Some(require_label("title", &title)?),
            None => None,
        };
        Ok(Self { title, ..self })
    }

    fn apply(&self, record: &mut PlanRecord) -> Self {
        let mut inverse = Self::default();
        if let Some(title) = &self.title {
            inverse.title = Some(std::mem::replace(&mut record.title, title.clone()));
        }
        if let Some(category) = self.category {
            inverse.category = Some(std::mem::replace(&mut record.category, category));
        }
        if let Some(start) = self.start_time {
            inverse.start_time = Some(std::mem::replace(&mut record.start_time, start));
        }
        if let Some(end) = self.end_time {
            inverse.end_time = Some(std::mem::replace(&mut record.end_time, end));
        }
        inverse
    }

    fn to_row(&self) -> Row {
        let mut row = Map::new();
        if let Some(title) = &self.title {
            row.insert("title".into(), json!(title));
        }
        if let Some(category) = self.category {
            row.insert("category".into(), json!(category));
        }
        if let Some(start) = self.start_time {
            row.insert("start_time".into(), json!(start));
        }
        if let Some(end) = self.end_time {
            row.insert("end_time".into(), json!(end));
        }
        Row::Object(row)
    }
}
