//! Reading and writing `config.toml`.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, info, warn};

use super::app_config::{AppConfig, project_dirs};

const CONFIG_FILE_NAME: &str = "config.toml";

/// Failure to read or write configuration files.
#[derive(Debug, Error)]
#[allow(missing_docs)]
pub enum ConfigError {
    #[error("no per-user config directory on this platform")]
    NoConfigDir,
    #[error("config file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to encode config: {0}")]
    Encode(#[from] toml::ser::Error),
}

impl ConfigError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        Self::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// Owns the location of `config.toml`.
pub struct StorageManager {
    config_dir: PathBuf,
}

impl StorageManager {
    /// Uses the platform config directory, e.g. `~/.config/discipline-os`.
    ///
    /// # Errors
    /// Returns `ConfigError::NoConfigDir` when no home directory is known.
    pub fn new() -> Result<Self, ConfigError> {
        let dirs = project_dirs().ok_or(ConfigError::NoConfigDir)?;
        Ok(Self::with_dir(dirs.config_dir().to_path_buf()))
    }

    #[must_use]
    pub fn with_dir(config_dir: PathBuf) -> Self {
        Self { config_dir }
    }

    #[must_use]
    pub fn config_dir(&self) -> &Path {
        &self.config_dir
    }

    /// Path of the config file, `path_override` taking precedence.
    #[must_use]
    pub fn config_path(&self, path_override: Option<&Path>) -> PathBuf {
        path_override.map_or_else(|| self.config_dir.join(CONFIG_FILE_NAME), Path::to_path_buf)
    }

    /// Loads the configuration, writing a default file on first run.
    ///
    /// A file that does not parse is left untouched and defaults are used.
    ///
    /// # Errors
    /// Returns `ConfigError` when the file cannot be read or the default cannot be written.
    pub fn load_config(&self, path_override: Option<&Path>) -> Result<AppConfig, ConfigError> {
        let path = self.config_path(path_override);

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!(path = %path.display(), "No config file, writing defaults");
                let config = AppConfig {
                    config: Some(path.clone()),
                    ..AppConfig::default()
                };
                write_atomic(&path, &toml::to_string_pretty(&config)?)?;
                return Ok(config);
            }
            Err(e) => return Err(ConfigError::io(&path, e)),
        };

        match toml::from_str::<AppConfig>(&content) {
            Ok(mut config) => {
                debug!(path = %path.display(), "Config loaded");
                config.config = Some(path);
                Ok(config)
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Malformed config file, using defaults");
                Ok(AppConfig::default())
            }
        }
    }

    /// Writes the configuration to the file it was loaded from.
    ///
    /// # Errors
    /// Returns `ConfigError` if the file cannot be written.
    pub fn save_config(&self, config: &AppConfig) -> Result<(), ConfigError> {
        let path = self.config_path(config.config.as_deref());
        write_atomic(&path, &toml::to_string_pretty(config)?)
    }
}

/// Replaces `path` through a temp file in the same directory.
fn write_atomic(path: &Path, content: &str) -> Result<(), ConfigError> {
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    fs::create_dir_all(dir).map_err(|e| ConfigError::io(dir, e))?;

    let mut file = tempfile::NamedTempFile::new_in(dir).map_err(|e| ConfigError::io(dir, e))?;
    file.write_all(content.as_bytes())
        .map_err(|e| ConfigError::io(path, e))?;
    file.persist(path).map_err(|e| ConfigError::io(path, e.error))?;
    Ok(())
}
