//! Domain error types.

mod reconcile_error;
mod store_error;
mod validation_error;

pub use reconcile_error::ReconcileError;
pub use store_error::StoreError;
pub use validation_error::{MappingError, ValidationError};
