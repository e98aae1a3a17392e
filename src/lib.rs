//! Discipline OS - habits, to-dos, a kanban board, a planner and a vision board
//! kept in a hosted data store.
//!
//! Every change is applied to the local collection first and reconciled with the
//! store once the remote call settles, rolling back and notifying on failure.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

/// Application layer containing the reconciler, services and views.
pub mod application;
/// Domain layer containing entities, errors, and port definitions.
pub mod domain;
/// Infrastructure layer containing configuration and the data store adapter.
pub mod infrastructure;
/// Presentation layer containing the command line interface.
pub mod presentation;

/// Current version of the application.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Application name.
pub const NAME: &str = "discipline";
