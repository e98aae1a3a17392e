use super::app_config::LogLevel;
use clap::Args;
use std::path::PathBuf;

/// Global flags overriding `config.toml`.
#[derive(Debug, Default, Args)]
pub struct CliArgs {
    /// Configuration file path.
    #[arg(short, long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Log file path.
    #[arg(long, value_name = "PATH", global = true)]
    pub log_path: Option<PathBuf>,

    /// Log verbosity level.
    #[arg(long, value_enum, global = true)]
    pub log_level: Option<LogLevel>,

    /// Data store base URL.
    #[arg(long, env = "DISCIPLINE_STORE_URL", value_name = "URL", global = true)]
    pub store_url: Option<String>,

    /// Data store API key.
    #[arg(long, env = "DISCIPLINE_API_KEY", hide_env_values = true, global = true)]
    pub api_key: Option<String>,

    /// Session access token.
    #[arg(long, env = "DISCIPLINE_ACCESS_TOKEN", hide_env_values = true, global = true)]
    pub access_token: Option<String>,

    /// Owner id for created rows.
    #[arg(long, env = "DISCIPLINE_USER_ID", global = true)]
    pub user_id: Option<String>,

    /// Request timeout in seconds.
    #[arg(long, value_name = "SECS", global = true)]
    pub timeout_secs: Option<u64>,

    /// Enable notifications.
    #[arg(long, global = true)]
    pub notifications: Option<bool>,

    /// Notification duration in seconds.
    #[arg(long, value_name = "SECS", global = true)]
    pub notification_duration: Option<u64>,
}
