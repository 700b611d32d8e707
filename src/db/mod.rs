//! Database layer for the todo store.

pub mod todos;

use anyhow::Result;
use rusqlite::Connection;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// How long a statement waits on another session's file lock before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Handle to the SQLite-backed todo store.
///
/// Only the file path is held. Each operation opens its own connection,
/// runs a single statement and drops the connection before returning, so no
/// connection outlives the call that needed it.
#[derive(Debug, Clone)]
pub struct Database {
    path: PathBuf,
}

impl Database {
    /// Open or create the database at the given path and ensure the schema.
    ///
    /// Safe to call on every start: the schema migration is create-if-absent
    /// and refinery skips migrations that were already applied.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let db = Self { path };

        {
            let mut conn = db.connect()?;
            // WAL is persistent on the file, so setting it once here is enough.
            conn.execute_batch("PRAGMA journal_mode=WAL;")?;
            embedded::migrations::runner().run(&mut conn)?;
        }

        debug!("Todo store ready at {:?}", db.path);
        Ok(db)
    }

    /// Path of the backing database file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn connect(&self) -> Result<Connection> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(conn)
    }

    /// Execute a function with a connection scoped to this call.
    ///
    /// The connection is closed when the closure returns, on success and on error alike.
    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.connect()?;
        f(&conn)
    }
}
