//! Vision board entity.

use serde::Deserialize;
use serde_json::{Map, json};

use super::record::{Draft, FromRow, InsertPosition, Patch, Record, Row, decode_row, require_label};
use super::ItemId;
use crate::domain::errors::{MappingError, ValidationError};
use crate::domain::ports::{Collection, Direction, Query};
use crate::domain::serde_utils::{id_string, null_as_default};

#[derive(Debug, Deserialize)]
struct VisionRow {
    #[serde(with = "id_string")]
    id: String,
    image_url: String,
    #[serde(default, deserialize_with = "null_as_default")]
    caption: String,
    #[serde(default, deserialize_with = "null_as_default")]
    position: i32,
}

/// An image pinned to the vision board.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionItem {
    /// Image location.
    pub image_url: String,
    /// Optional caption, empty when absent.
    pub caption: String,
    /// Sort key on the board.
    pub position: i32,
}

impl FromRow for VisionItem {
    const COLLECTION: Collection = Collection::VisionBoard;

    fn from_row(row: Row) -> Result<(ItemId, Self), MappingError> {
        let row: VisionRow = decode_row(Self::COLLECTION, row)?;
        Ok((
            ItemId::new(row.id),
            Self {
                image_url: row.image_url,
                caption: row.caption,
                position: row.position,
            },
        ))
    }
}

impl Record for VisionItem {
    type Draft = VisionDraft;
    type Patch = VisionPatch;

    const INSERT_AT: InsertPosition = InsertPosition::Tail;
    const NOUN: &'static str = "image";

    fn load_query() -> Query {
        Query::new().order_by("position", Direction::Asc)
    }
}

/// A new board image.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionDraft {
    /// Image location.
    pub image_url: String,
    /// Caption, may be empty.
    pub caption: String,
    /// Sort key on the board.
    pub position: i32,
}

impl Draft<VisionItem> for VisionDraft {
    fn validate(self) -> Result<Self, ValidationError> {
        let image_url = require_label("image url", &self.image_url)?;
        if !(image_url.starts_with("http://") || image_url.starts_with("https://")) {
            return Err(ValidationError::invalid("image url", "must be an http(s) address"));
        }
        Ok(Self {
            image_url,
            caption: self.caption.trim().to_string(),
            position: self.position,
        })
    }

    fn provisional(&self) -> VisionItem {
        VisionItem {
            image_url: self.image_url.clone(),
            caption: self.caption.clone(),
            position: self.position,
        }
    }

    fn to_row(&self) -> Row {
        json!({
            "image_url": self.image_url,
            "caption": self.caption,
            "position": self.position,
        })
    }
}

/// Change to a board image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VisionPatch {
    /// New caption.
    pub caption: Option<String>,
    /// New sort key.
    pub position: Option<i32>,
}

impl Patch<VisionItem> for VisionPatch {
    fn apply(&self, record: &mut VisionItem) -> Self {
        Self {
            caption: self
                .caption
                .as_ref()
                .map(|caption| std::mem::replace(&mut record.caption, caption.clone())),
            position: self
                .position
                .map(|position| std::mem::replace(&mut record.position, position)),
        }
    }

    fn to_row(&self) -> Row {
        let mut row = Map::new();
        if let Some(caption) = &self.caption {
            row.insert("caption".into(), json!(caption));
        }
        if let Some(position) = self.position {
            row.insert("position".into(), json!(position));
        }
        Row::Object(row)
    }
}
