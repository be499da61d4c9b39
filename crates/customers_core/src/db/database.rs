//! Shared handle to one file-backed customers database.

use super::{open_db, DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

/// Cheap, cloneable handle that opens a private connection per call.
///
/// SQLite connections are not meant to be shared between threads, so the
/// handle only keeps the path. Migrations run once in [`Database::open`]; later
/// [`Database::connect`] calls find the schema current and skip them.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Bootstraps the database file at `path`, creating it and its parent
    /// directories when missing.
    pub fn open(path: impl AsRef<Path>) -> DbResult<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|parent| !parent.as_os_str().is_empty()) {
            if let Err(source) = std::fs::create_dir_all(parent) {
                error!(
                    "event=database_ready module=db status=error error_code=create_dir_failed path={} error={}",
                    parent.display(),
                    source
                );
                return Err(DbError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                });
            }
        }
        drop(open_db(&path)?);
        info!(
            "event=database_ready module=db status=ok path={}",
            path.display()
        );
        Ok(Self { path })
    }

    /// Opens a new connection owned by the caller.
    pub fn connect(&self) -> DbResult<Connection> {
        open_db(&self.path)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
