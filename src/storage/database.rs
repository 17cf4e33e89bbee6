//! `SQLite` database connection and operations.
//!
//! The database is stored at `~/.boardsync/boardsync.db` and contains tables for:
//! - Sync queue (pending mutations)
//! - Dead letters (mutations that will not be retried)
//! - Kanban boards
//!
//! The connection runs with `synchronous = FULL`, so a statement that
//! returns `Ok` has been committed to disk.

use rusqlite::{Connection, Transaction};

use crate::config::Paths;
use crate::error::BoardsyncError;

use super::migrations;

/// Database connection wrapper.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Open the database at the location described by `paths`.
    ///
    /// Creates the data directory, the database file, and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open(paths: &Paths) -> Result<Self, BoardsyncError> {
        paths.ensure_dirs()?;
        Self::open_at(&paths.database)
    }

    /// Open the database at a specific path.
    ///
    /// Creates the database file and runs migrations if necessary.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_at(path: &std::path::Path) -> Result<Self, BoardsyncError> {
        let conn = Connection::open(path).map_err(|e| {
            BoardsyncError::Database(format!("Failed to open database {}: {e}", path.display()))
        })?;

        Self::init(conn)
    }

    /// Open an in-memory database (useful for testing).
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or migrations fail.
    pub fn open_in_memory() -> Result<Self, BoardsyncError> {
        let conn = Connection::open_in_memory().map_err(|e| {
            BoardsyncError::Database(format!("Failed to open in-memory database: {e}"))
        })?;

        Self::init(conn)
    }

    fn init(conn: Connection) -> Result<Self, BoardsyncError> {
        conn.execute_batch("PRAGMA foreign_keys = ON; PRAGMA synchronous = FULL;")
            .map_err(|e| BoardsyncError::Database(format!("Failed to configure database: {e}")))?;

        let db = Self { conn };
        db.migrate()?;

        Ok(db)
    }

    /// Run database migrations.
    fn migrate(&self) -> Result<(), BoardsyncError> {
        migrations::run(&self.conn)
    }

    /// Get the current schema version.
    ///
    /// # Errors
    ///
    /// Returns an error if the version cannot be read.
    pub fn schema_version(&self) -> Result<i32, BoardsyncError> {
        migrations::get_version(&self.conn)
    }

    /// Get a reference to the underlying connection.
    ///
    /// This is primarily for use by feature modules that need direct access.
    #[must_use]
    pub const fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Begin a transaction on the shared connection.
    ///
    /// The transaction rolls back on drop unless committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the transaction cannot be started.
    pub fn transaction(&self) -> Result<Transaction<'_>, BoardsyncError> {
        self.conn
            .unchecked_transaction()
            .map_err(|e| BoardsyncError::Database(format!("Failed to begin transaction: {e}")))
    }
}
