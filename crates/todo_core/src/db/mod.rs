//! Todo store bootstrap: where the SQLite file lives and which schema it has.
//!
//! # Responsibility
//! - Hand out connections to the `todos` store, file-backed or in-memory.
//! - Bring the schema to the latest `user_version` before first use.
//!
//! # Invariants
//! - A missing parent directory of a store file is created on open.
//! - A store written by a newer build is refused, never downgraded.
//! - Nothing outside this module reads `todos` before migrations succeed.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory};

/// Result of opening or migrating the todo store.
pub type DbResult<T> = Result<T, DbError>;

/// Why the todo store could not be opened.
#[derive(Debug)]
pub enum DbError {
    /// The directory meant to hold the store file could not be created.
    CreateParentDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// The file carries a schema version this build does not know.
    SchemaTooNew { found: u32, supported: u32 },
    Sqlite(rusqlite::Error),
}

impl DbError {
    /// Stable code for logs and front ends.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::CreateParentDir { .. } => "db_dir_unavailable",
            Self::SchemaTooNew { .. } => "db_schema_too_new",
            Self::Sqlite(_) => "db_open_failed",
        }
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateParentDir { path, source } => {
                write!(f, "cannot create store directory `{}`: {source}", path.display())
            }
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "todo store has schema version {found}; this build supports up to {supported}"
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateParentDir { source, .. } => Some(source),
            Self::SchemaTooNew { .. } => None,
            Self::Sqlite(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

#[cfg(test)]
mod tests {
    use super::DbError;
    use std::error::Error;

    #[test]
    fn schema_too_new_names_both_versions() {
        let err = DbError::SchemaTooNew {
            found: 7,
            supported: 1,
        };
        assert_eq!(err.error_code(), "db_schema_too_new");
        assert_eq!(
            err.to_string(),
            "todo store has schema version 7; this build supports up to 1"
        );
        assert!(err.source().is_none());
    }

    #[test]
    fn create_parent_dir_keeps_io_cause() {
        let err = DbError::CreateParentDir {
            path: "/nowhere/todo".into(),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.error_code(), "db_dir_unavailable");
        assert!(err.to_string().contains("/nowhere/todo"));
        assert!(err.source().is_some());
    }
}
