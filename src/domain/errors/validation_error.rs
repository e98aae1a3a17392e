//! Local precondition failures.

use thiserror::Error;

/// A mutation failed a local precondition and was never sent to the store.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ValidationError {
    #[error("{field} cannot be empty")]
    EmptyLabel { field: &'static str },

    #[error("end time must not be before start time")]
    InvalidTimeRange,

    #[error("invalid {field}: {reason}")]
    InvalidValue { field: &'static str, reason: String },
}

impl ValidationError {
    /// Creates empty label error.
    #[must_use]
    pub const fn empty(field: &'static str) -> Self {
        Self::EmptyLabel { field }
    }

    /// Creates invalid value error.
    #[must_use]
    pub fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            reason: reason.into(),
        }
    }
}

/// A row returned by the store did not match the expected record shape.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("malformed {collection} row: {reason}")]
pub struct MappingError {
    /// Table the row came from.
    pub collection: &'static str,
    /// Decoder message.
    pub reason: String,
}

impl MappingError {
    /// Creates mapping error for a table.
    #[must_use]
    pub fn new(collection: &'static str, reason: impl Into<String>) -> Self {
        Self {
            collection,
            reason: reason.into(),
        }
    }
}
