//! Infrastructure layer with external service adapters.

/// Application configuration.
pub mod config;
/// REST gateway client for the hosted data store.
pub mod postgrest;

pub use config::{AppConfig, CliArgs, ConfigError, LogLevel, StorageManager, StoreConfig};
pub use postgrest::PostgrestClient;
