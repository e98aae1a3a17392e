//! Domain layer with typed records, errors, and port definitions.

/// Entity definitions.
pub mod entities;
/// Error types.
pub mod errors;
/// Notification value types.
pub mod notification;
/// Port definitions.
pub mod ports;
/// Serde utilities.
pub mod serde_utils;

pub use entities::{ItemId, ItemKey, Record, TempId, Tracked};
pub use errors::{ReconcileError, StoreError, ValidationError};
pub use notification::{Notification, NotificationKind};
pub use ports::{NotificationPort, RemoteStorePort};
