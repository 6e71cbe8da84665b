//! Explicit runtime configuration for embedding the library core.
//!
//! Callers build a `CoreConfig` and pass it to `bootstrap`; nothing in core
//! reads the environment on its own.

use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{default_log_level, init_logging, LoggingError};
use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Database path that selects a private in-memory store.
pub const IN_MEMORY_DB_PATH: &str = ":memory:";

/// Errors from configuration validation and bootstrap.
#[derive(Debug)]
pub enum ConfigError {
    /// Database path is empty.
    EmptyDbPath,
    /// Logging could not be started.
    Logging(LoggingError),
    /// Database could not be opened or migrated.
    Db(DbError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyDbPath => write!(f, "database path must not be empty"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyDbPath => None,
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<LoggingError> for ConfigError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for ConfigError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Settings needed to open a library store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreConfig {
    /// SQLite file path, or `:memory:`.
    pub db_path: PathBuf,
    /// One of `trace|debug|info|warn|error`.
    pub log_level: String,
    /// Absolute log directory. `None` leaves logging to the host.
    pub log_dir: Option<PathBuf>,
}

impl CoreConfig {
    /// Creates a config with the build's default log level and no log dir.
    pub fn new(db_path: impl Into<PathBuf>) -> Self {
        Self {
            db_path: db_path.into(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }

    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    pub fn with_log_dir(mut self, log_dir: impl Into<PathBuf>) -> Self {
        self.log_dir = Some(log_dir.into());
        self
    }

    pub fn is_in_memory(&self) -> bool {
        self.db_path.as_os_str() == IN_MEMORY_DB_PATH
    }

    /// Checks settings that do not need I/O.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.db_path.as_os_str().is_empty() {
            return Err(ConfigError::EmptyDbPath);
        }
        Ok(())
    }
}

/// Starts logging (when a directory is configured) and opens the store.
pub fn bootstrap(config: &CoreConfig) -> Result<Connection, ConfigError> {
    config.validate()?;
    if let Some(log_dir) = &config.log_dir {
        init_logging(&config.log_level, log_dir)?;
    }

    let conn = if config.is_in_memory() {
        open_db_in_memory()?
    } else {
        open_db(&config.db_path)?
    };
    Ok(conn)
}
