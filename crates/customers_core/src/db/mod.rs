//! Customers database: where it lives, how it is opened, what can go wrong.
//!
//! # Responsibility
//! - Resolve the customers database location and create its directory.
//! - Open configured SQLite connections with the `customers` schema applied.
//! - Hand out one private connection per call through [`Database`].
//!
//! # Invariants
//! - The schema version is `PRAGMA user_version`; a newer file is refused
//!   instead of being read with an older layout.
//! - No customer row is read or written on a connection that has not been
//!   migrated.
//! - A connection is owned by exactly one call and never shared across threads.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod database;
pub mod migrations;
mod open;

pub use database::Database;
pub use open::{open_db, open_db_in_memory};

pub type DbResult<T> = Result<T, DbError>;

/// Location label used for in-memory connections.
pub const MEMORY_LOCATION: &str = ":memory:";

/// Failure while locating, opening or migrating the customers database.
#[derive(Debug)]
pub enum DbError {
    /// The directory meant to hold the database file could not be created.
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },
    /// SQLite refused to open the database at `location`.
    Open {
        location: String,
        source: rusqlite::Error,
    },
    /// Any later statement, pragma or migration failure.
    Sqlite(rusqlite::Error),
    UnsupportedSchemaVersion {
        db_version: u32,
        latest_supported: u32,
    },
}

impl DbError {
    /// True when SQLite gave up waiting on another writer's lock.
    pub fn is_busy(&self) -> bool {
        let source = match self {
            Self::Open { source, .. } | Self::Sqlite(source) => source,
            Self::CreateDir { .. } | Self::UnsupportedSchemaVersion { .. } => return false,
        };
        matches!(
            source.sqlite_error_code(),
            Some(rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked)
        )
    }
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::CreateDir { path, source } => write!(
                f,
                "cannot create customers database directory {}: {source}",
                path.display()
            ),
            Self::Open { location, source } => {
                write!(f, "cannot open customers database {location}: {source}")
            }
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::UnsupportedSchemaVersion {
                db_version,
                latest_supported,
            } => write!(
                f,
                "customers schema version {db_version} is newer than supported {latest_supported}"
            ),
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::CreateDir { source, .. } => Some(source),
            Self::Open { source, .. } | Self::Sqlite(source) => Some(source),
            Self::UnsupportedSchemaVersion { .. } => None,
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
    use std::path::PathBuf;

    fn busy() -> rusqlite::Error {
        rusqlite::Error::SqliteFailure(
            rusqlite::ffi::Error::new(rusqlite::ffi::SQLITE_BUSY),
            Some("database is locked".to_string()),
        )
    }

    #[test]
    fn open_error_names_location_and_keeps_source() {
        let err = DbError::Open {
            location: "/srv/customers.sqlite3".to_string(),
            source: busy(),
        };
        assert!(err
            .to_string()
            .starts_with("cannot open customers database /srv/customers.sqlite3: "));
        assert!(err.source().is_some());
        assert!(err.is_busy());
    }

    #[test]
    fn create_dir_error_is_never_busy() {
        let err = DbError::CreateDir {
            path: PathBuf::from("/srv/customers"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(
            err.to_string(),
            "cannot create customers database directory /srv/customers: denied"
        );
        assert!(!err.is_busy());
    }

    #[test]
    fn schema_version_error_has_no_source() {
        let err = DbError::UnsupportedSchemaVersion {
            db_version: 9,
            latest_supported: 1,
        };
        assert_eq!(
            err.to_string(),
            "customers schema version 9 is newer than supported 1"
        );
        assert!(err.source().is_none());
        assert!(!DbError::from(rusqlite::Error::QueryReturnedNoRows).is_busy());
    }
}
