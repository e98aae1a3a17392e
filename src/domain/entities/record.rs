//! Contracts between typed records and the untyped rows of the data store.
//!
//! Every collection has one record type. Rows are decoded into it at the
//! boundary, so nothing downstream ever inspects raw JSON.

use serde::de::DeserializeOwned;

use super::ItemId;
use crate::domain::errors::{MappingError, ValidationError};
use crate::domain::ports::{Collection, Query};

/// Raw row exchanged with the data store.
pub type Row = serde_json::Value;

/// Where optimistically created items enter a collection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertPosition {
    /// Newest first.
    Head,
    /// Creation order.
    Tail,
}

/// A record type that can be decoded from a store row.
pub trait FromRow: Sized {
    /// Collection the rows live in.
    const COLLECTION: Collection;

    /// Decodes a row into its durable id and typed fields.
    ///
    /// # Errors
    /// Returns `MappingError` when the row does not have the expected shape.
    fn from_row(row: Row) -> Result<(ItemId, Self), MappingError>;
}

/// A record type that can be mutated optimistically.
pub trait Record: FromRow + Clone + std::fmt::Debug + Send + Sync + 'static {
    /// Fields submitted when creating an item.
    type Draft: Draft<Self>;
    /// Field changes applied to an existing item.
    type Patch: Patch<Self>;

    /// Where new items are inserted.
    const INSERT_AT: InsertPosition;
    /// Lowercase noun used in user-facing notifications.
    const NOUN: &'static str;

    /// Query used to (re)load the collection.
    fn load_query() -> Query;
}

/// Fields for a new item of record type `R`.
pub trait Draft<R>: Clone + Send + 'static {
    /// Checks preconditions and returns the normalized draft.
    ///
    /// # Errors
    /// Returns `ValidationError` when a precondition fails.
    fn validate(self) -> Result<Self, ValidationError>;

    /// Builds the local record shown while the create call is in flight.
    fn provisional(&self) -> R;

    /// Encodes the insert payload.
    fn to_row(&self) -> Row;
}

/// A change to fields of record type `R`.
pub trait Patch<R>: Clone + std::fmt::Debug + Send + 'static {
    /// Checks preconditions and returns the normalized patch.
    ///
    /// # Errors
    /// Returns `ValidationError` when a precondition fails.
    fn validate(self) -> Result<Self, ValidationError> {
        Ok(self)
    }

    /// Applies the change and returns the patch that undoes it.
    #[must_use]
    fn apply(&self, record: &mut R) -> Self;

    /// Applies an inverse produced by [`Patch::apply`], discarding the redo patch.
    fn revert(&self, record: &mut R) {
        let _redo = self.apply(record);
    }

    /// Encodes the update payload.
    fn to_row(&self) -> Row;
}

/// Decodes a row into a serde shape, tagging failures with the table name.
///
/// # Errors
/// Returns `MappingError` when deserialization fails.
pub fn decode_row<T: DeserializeOwned>(collection: Collection, row: Row) -> Result<T, MappingError> {
    serde_json::from_value(row).map_err(|e| MappingError::new(collection.table(), e.to_string()))
}

/// Trims a label and rejects it when nothing is left.
///
/// # Errors
/// Returns `ValidationError::EmptyLabel` for blank input.
pub fn require_label(field: &'static str, value: &str) -> Result<String, ValidationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty(field));
    }
    Ok(trimmed.to_string())
}
