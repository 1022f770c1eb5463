//! TOML configuration file loading
//!
//! ```toml
//! [queue]
//! capacity = 1048576
//! flush_interval_ms = 7500
//! flush_timeout_secs = 180
//!
//! [storage]
//! directory = "/var/lib/systemlog"
//!
//! [logging]
//! level = "info"
//! format = "text"
//! file = "none"
//! color = true
//! ```
//!
//! Without `--config-file` the default `<config dir>/systemlog/systemlog.toml`
//! is read if it exists. Missing keys fall back to the built-in defaults.

use super::args::Args;
use crate::core::error_handling::ContextualError;
use crate::core::validation::{validate_capacity, validate_duration, ValidationError};
use crate::queue::{
    QueueSettings, DEFAULT_FLUSH_INTERVAL, DEFAULT_FLUSH_TIMEOUT, DEFAULT_QUEUE_CAPACITY,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Error reading configuration file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Error parsing configuration file {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("The specified configuration file does not exist: {path}")]
    NotFound { path: PathBuf },

    #[error(transparent)]
    Validation(#[from] ValidationError),
}

impl ContextualError for ConfigError {
    fn is_user_actionable(&self) -> bool {
        !matches!(self, ConfigError::Io { .. })
    }

    fn user_message(&self) -> Option<&str> {
        match self {
            ConfigError::Validation(e) => Some(e.message()),
            ConfigError::NotFound { .. } => Some("The specified configuration file does not exist"),
            ConfigError::Parse { .. } => Some("The configuration file is not valid TOML"),
            ConfigError::Io { .. } => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct QueueSection {
    pub capacity: usize,
    pub flush_interval_ms: u64,
    pub flush_timeout_secs: u64,
}

impl Default for QueueSection {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_QUEUE_CAPACITY,
            flush_interval_ms: DEFAULT_FLUSH_INTERVAL.as_millis() as u64,
            flush_timeout_secs: DEFAULT_FLUSH_TIMEOUT.as_secs(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorageSection {
    pub directory: PathBuf,
}

impl Default for StorageSection {
    fn default() -> Self {
        Self {
            directory: dirs::data_local_dir()
                .map(|d| d.join("systemlog"))
                .unwrap_or_else(|| PathBuf::from("systemlog-data")),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub format: Option<String>,
    pub file: Option<String>,
    pub color: Option<bool>,
}

/// Effective configuration: defaults, then the file, then command-line flags
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Settings {
    pub queue: QueueSection,
    pub storage: StorageSection,
    pub logging: LoggingSection,
}

impl Settings {
    pub fn default_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("systemlog").join("systemlog.toml"))
    }

    /// Load `config_file`, or the default file if present, or the defaults
    pub async fn load(config_file: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match config_file {
            Some(path) if !path.exists() => {
                return Err(ConfigError::NotFound {
                    path: path.to_path_buf(),
                })
            }
            Some(path) => path.to_path_buf(),
            None => match Self::default_config_path() {
                Some(path) if path.exists() => path,
                _ => {
                    log::debug!("No configuration file found, using defaults");
                    return Ok(Self::default());
                }
            },
        };

        let contents = tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| ConfigError::Io {
                path: path.clone(),
                source,
            })?;
        let settings = Self::from_toml(&contents).map_err(|source| ConfigError::Parse {
            path: path.clone(),
            source,
        })?;
        log::debug!("Loaded configuration from {}", path.display());
        Ok(settings)
    }

    pub fn from_toml(contents: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(contents)
    }

    /// Let flags given on the command line override file values
    pub fn apply_args(&mut self, args: &Args) {
        if let Some(capacity) = args.capacity {
            self.queue.capacity = capacity;
        }
        if let Some(ms) = args.flush_interval_ms {
            self.queue.flush_interval_ms = ms as u64;
        }
        if let Some(secs) = args.flush_timeout_secs {
            self.queue.flush_timeout_secs = secs as u64;
        }
        if let Some(directory) = &args.storage_dir {
            self.storage.directory = directory.clone();
        }
        if let Some(level) = &args.log_level {
            self.logging.level = Some(level.clone());
        }
        if let Some(format) = &args.log_format {
            self.logging.format = Some(format.clone());
        }
        if let Some(file) = &args.log_file {
            self.logging.file = Some(file.to_string_lossy().into_owned());
        }
        if let Some(color) = args.color {
            self.logging.color = Some(color);
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_capacity(self.queue.capacity)?;
        validate_duration(
            "flush_interval_ms",
            Duration::from_millis(self.queue.flush_interval_ms),
        )?;
        validate_duration(
            "flush_timeout_secs",
            Duration::from_secs(self.queue.flush_timeout_secs),
        )?;
        Ok(())
    }

    pub fn queue_settings(&self) -> QueueSettings {
        QueueSettings::default()
            .with_capacity(self.queue.capacity)
            .with_flush_interval(Duration::from_millis(self.queue.flush_interval_ms))
            .with_flush_timeout(Duration::from_secs(self.queue.flush_timeout_secs))
    }

    /// Log file, with the magic values "none" and "-" meaning console only
    pub fn log_file(&self) -> Option<&str> {
        match self.logging.file.as_deref() {
            Some(file) if file.eq_ignore_ascii_case("none") || file == "-" => None,
            other => other,
        }
    }
}
