//! Errors returned synchronously by optimistic operations.

use thiserror::Error;

use super::ValidationError;
use crate::domain::entities::ItemKey;

/// Rejection of an optimistic operation before anything was applied.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum ReconcileError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("no item {key} in the collection")]
    UnknownItem { key: ItemKey },

    #[error("item {key} has a change in flight")]
    Busy { key: ItemKey },
}

impl ReconcileError {
    /// Returns whether the operation may succeed once pending calls settle.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        matches!(self, Self::Busy { .. })
    }
}
