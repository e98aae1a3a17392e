//! Identity and confirmation state of locally held items.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Durable identifier issued by the data store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// Wraps a store-issued identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for ItemId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Locally generated placeholder identity for an item the store has not confirmed yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TempId(Uuid);

impl TempId {
    /// Generates a fresh provisional identity.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for TempId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "temp-{}", self.0)
    }
}

/// Key addressing an item regardless of its confirmation state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ItemKey {
    /// Item still waiting for its create call.
    Temp(TempId),
    /// Item known to the store.
    Durable(ItemId),
}

impl std::fmt::Display for ItemKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Temp(temp_id) => temp_id.fmt(f),
            Self::Durable(id) => id.fmt(f),
        }
    }
}

impl From<TempId> for ItemKey {
    fn from(value: TempId) -> Self {
        Self::Temp(value)
    }
}

impl From<ItemId> for ItemKey {
    fn from(value: ItemId) -> Self {
        Self::Durable(value)
    }
}

/// An item in a local collection, either optimistically created or confirmed by the store.
#[derive(Debug, Clone, PartialEq)]
pub enum Tracked<R> {
    /// Inserted locally, create call in flight.
    Provisional {
        /// Placeholder identity.
        temp_id: TempId,
        /// Fields as submitted.
        record: R,
    },
    /// Persisted by the store.
    Confirmed {
        /// Store-issued identity.
        id: ItemId,
        /// Fields as last known.
        record: R,
    },
}

impl<R> Tracked<R> {
    /// Returns the key addressing this item.
    #[must_use]
    pub fn key(&self) -> ItemKey {
        match self {
            Self::Provisional { temp_id, .. } => ItemKey::Temp(*temp_id),
            Self::Confirmed { id, .. } => ItemKey::Durable(id.clone()),
        }
    }

    /// Returns whether this item is addressed by `key`.
    #[must_use]
    pub fn has_key(&self, key: &ItemKey) -> bool {
        match (self, key) {
            (Self::Provisional { temp_id, .. }, ItemKey::Temp(other)) => temp_id == other,
            (Self::Confirmed { id, .. }, ItemKey::Durable(other)) => id == other,
            _ => false,
        }
    }

    /// Returns the durable id when confirmed.
    #[must_use]
    pub const fn id(&self) -> Option<&ItemId> {
        match self {
            Self::Provisional { .. } => None,
            Self::Confirmed { id, .. } => Some(id),
        }
    }

    /// Returns the record fields.
    #[must_use]
    pub const fn record(&self) -> &R {
        match self {
            Self::Provisional { record, .. } | Self::Confirmed { record, .. } => record,
        }
    }

    /// Returns the record fields mutably.
    pub fn record_mut(&mut self) -> &mut R {
        match self {
            Self::Provisional { record, .. } | Self::Confirmed { record, .. } => record,
        }
    }

    /// Returns whether the store has confirmed this item.
    #[must_use]
    pub const fn is_confirmed(&self) -> bool {
        matches!(self, Self::Confirmed { .. })
    }
}
