//! Command line surface: argument parsing, command dispatch and text output.

pub mod app;
pub mod cli;
pub mod render;

pub use app::{App, CommandError};
pub use cli::{Cli, Command};
