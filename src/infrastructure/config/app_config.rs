//! Application configuration.

use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use super::args::CliArgs;
use crate::domain::entities::ApiKey;

const LOG_FILE_NAME: &str = "discipline.log";

/// Per-user directories of the application.
pub(super) fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from("app", "discipline", "discipline-os")
}

/// Log verbosity, also accepted as `EnvFilter` directive.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
#[allow(missing_docs)]
pub enum LogLevel {
    Trace,
    Debug,
    #[default]
    Info,
    Warn,
    Error,
}

impl LogLevel {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Application configuration, read from `config.toml` and overridden by CLI flags.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Configuration file path.
    #[serde(skip)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[serde(default)]
    pub log_level: LogLevel,

    /// Hosted data store connection.
    #[serde(default)]
    pub store: StoreConfig,

    /// Notification configuration.
    #[serde(default)]
    pub notifications: NotificationsConfig,
}

/// Data store connection settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`.
    #[serde(default)]
    pub url: Option<String>,

    /// Public API key sent as `apikey`.
    #[serde(default)]
    pub api_key: Option<ApiKey>,

    /// Session token sent as bearer. Falls back to the API key.
    #[serde(default)]
    pub access_token: Option<ApiKey>,

    /// Owner id stamped on created rows and used to scope lists.
    #[serde(default)]
    pub user_id: Option<String>,

    /// Per-request timeout in seconds.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl StoreConfig {
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            url: None,
            api_key: None,
            access_token: None,
            user_id: None,
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Notification configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationsConfig {
    /// Enable notifications globally.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Display duration in seconds.
    #[serde(default = "default_notification_duration")]
    pub duration_secs: u64,
}

impl NotificationsConfig {
    #[must_use]
    pub const fn duration(&self) -> Duration {
        Duration::from_secs(self.duration_secs)
    }
}

impl Default for NotificationsConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            duration_secs: default_notification_duration(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_notification_duration() -> u64 {
    4
}

fn default_timeout_secs() -> u64 {
    15
}

fn override_with<T>(slot: &mut T, value: Option<T>) {
    if let Some(value) = value {
        *slot = value;
    }
}

impl AppConfig {
    /// Applies command line flags on top of the file values.
    ///
    /// Blank credentials given on the command line are ignored.
    pub fn merge_with_args(&mut self, args: CliArgs) {
        self.config = args.config.or(self.config.take());
        self.log_path = args.log_path.or(self.log_path.take());
        override_with(&mut self.log_level, args.log_level);

        let store = &mut self.store;
        store.url = args.store_url.or(store.url.take());
        store.api_key = args.api_key.and_then(ApiKey::new).or(store.api_key.take());
        store.access_token = args
            .access_token
            .and_then(ApiKey::new)
            .or(store.access_token.take());
        store.user_id = args.user_id.or(store.user_id.take());
        override_with(&mut store.timeout_secs, args.timeout_secs);

        override_with(&mut self.notifications.enabled, args.notifications);
        override_with(
            &mut self.notifications.duration_secs,
            args.notification_duration,
        );
    }

    /// Log file from the config, or `discipline.log` in the data directory.
    #[must_use]
    pub fn effective_log_path(&self) -> Option<PathBuf> {
        self.log_path
            .clone()
            .or_else(|| project_dirs().map(|dirs| dirs.data_dir().join(LOG_FILE_NAME)))
    }
}
