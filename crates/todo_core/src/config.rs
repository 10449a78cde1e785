//! Runtime configuration for hosting the todo core.
//!
//! # Responsibility
//! - Resolve database location and logging settings from the environment.
//! - Open the configured store and start logging in one place.
//!
//! # Invariants
//! - Without an explicit location the store is the file
//!   `<temp dir>/todo.sqlite3`, shared by every process that uses defaults.
//! - An in-memory store is only used when requested explicitly.
//! - Logging is only started when a log directory is configured.

use crate::db::{open_db, open_db_in_memory, DbResult};
use crate::logging::{default_log_level, init_logging, LoggingError};
use rusqlite::Connection;
use std::path::PathBuf;

pub const ENV_DB_PATH: &str = "TODO_DB_PATH";
pub const ENV_LOG_LEVEL: &str = "TODO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TODO_LOG_DIR";

/// File name of the default store inside the system temp directory.
pub const DEFAULT_DB_FILE_NAME: &str = "todo.sqlite3";
/// Setting value that selects a private in-memory store.
pub const IN_MEMORY_DB: &str = ":memory:";

/// Where the todo store lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbLocation {
    File(PathBuf),
    /// Private to one connection; gone when it closes.
    InMemory,
}

impl DbLocation {
    /// Parses a setting value. `:memory:` selects `InMemory`, anything else
    /// is a file path.
    pub fn from_setting(value: &str) -> Self {
        if value == IN_MEMORY_DB {
            Self::InMemory
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

impl Default for DbLocation {
    fn default() -> Self {
        Self::File(default_db_path())
    }
}

/// `<temp dir>/todo.sqlite3`.
pub fn default_db_path() -> PathBuf {
    std::env::temp_dir().join(DEFAULT_DB_FILE_NAME)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodoConfig {
    pub db: DbLocation,
    pub log_level: String,
    pub log_dir: Option<PathBuf>,
}

impl Default for TodoConfig {
    fn default() -> Self {
        Self {
            db: DbLocation::default(),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl TodoConfig {
    /// Default settings backed by an in-memory store.
    pub fn in_memory() -> Self {
        Self {
            db: DbLocation::InMemory,
            ..Self::default()
        }
    }

    /// Reads `TODO_DB_PATH`, `TODO_LOG_LEVEL` and `TODO_LOG_DIR`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary key lookup. Blank values count as
    /// unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let read = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let defaults = Self::default();
        Self {
            db: read(ENV_DB_PATH)
                .map(|value| DbLocation::from_setting(&value))
                .unwrap_or(defaults.db),
            log_level: read(ENV_LOG_LEVEL).unwrap_or(defaults.log_level),
            log_dir: read(ENV_LOG_DIR).map(PathBuf::from),
        }
    }

    /// Opens the configured database with migrations applied.
    pub fn open_db(&self) -> DbResult<Connection> {
        match &self.db {
            DbLocation::File(path) => open_db(path),
            DbLocation::InMemory => open_db_in_memory(),
        }
    }

    /// Starts file logging if `log_dir` is set.
    pub fn init_logging(&self) -> Result<(), LoggingError> {
        match &self.log_dir {
            Some(dir) => init_logging(&self.log_level, dir),
            None => Ok(()),
        }
    }
}
