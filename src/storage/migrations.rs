//! Database migrations for boardsync.
//!
//! Each migration is a function that upgrades the schema by one version.
//! Migrations are run automatically when the database is opened.

use rusqlite::Connection;

use crate::error::BoardsyncError;

/// Current schema version.
const CURRENT_VERSION: i32 = 2;

/// Get the current schema version from the database.
///
/// Returns 0 if no version has been set (new database).
pub fn get_version(conn: &Connection) -> Result<i32, BoardsyncError> {
    let version: i32 = conn
        .query_row("PRAGMA user_version", [], |row| row.get(0))
        .map_err(|e| BoardsyncError::Database(format!("Failed to get schema version: {e}")))?;

    Ok(version)
}

/// Set the schema version in the database.
fn set_version(conn: &Connection, version: i32) -> Result<(), BoardsyncError> {
    conn.execute_batch(&format!("PRAGMA user_version = {version};"))
        .map_err(|e| BoardsyncError::Database(format!("Failed to set schema version: {e}")))
}

/// Run all pending migrations.
pub fn run(conn: &Connection) -> Result<(), BoardsyncError> {
    let current = get_version(conn)?;

    if current >= CURRENT_VERSION {
        return Ok(());
    }

    for version in (current + 1)..=CURRENT_VERSION {
        tracing::debug!(version, "applying schema migration");
        run_migration(conn, version)?;
        set_version(conn, version)?;
    }

    Ok(())
}

/// Run a specific migration.
fn run_migration(conn: &Connection, version: i32) -> Result<(), BoardsyncError> {
    match version {
        1 => migrate_v1(conn),
        2 => migrate_v2(conn),
        _ => Err(BoardsyncError::Database(format!(
            "Unknown migration version: {version}"
        ))),
    }
}

/// Migration v1: sync queue.
///
/// Creates tables for:
/// - `sync_queue`: pending mutations keyed by their idempotency id
/// - `dead_letters`: mutations removed from the retry path
fn migrate_v1(conn: &Connection) -> Result<(), BoardsyncError> {
    conn.execute_batch(
        r"
        -- seq is the delivery order; created_at is informational
        CREATE TABLE IF NOT EXISTS sync_queue (
            seq INTEGER PRIMARY KEY AUTOINCREMENT,
            id TEXT NOT NULL UNIQUE,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            attempts INTEGER NOT NULL DEFAULT 0,
            last_attempt TEXT,
            last_error TEXT,
            status TEXT NOT NULL DEFAULT 'pending'
        );

        CREATE INDEX IF NOT EXISTS idx_sync_queue_status
        ON sync_queue(status);

        CREATE TABLE IF NOT EXISTS dead_letters (
            id TEXT PRIMARY KEY,
            payload TEXT NOT NULL,
            created_at TEXT NOT NULL,
            attempts INTEGER NOT NULL,
            failed_at TEXT NOT NULL,
            reason TEXT NOT NULL,
            status_code INTEGER,
            kind TEXT NOT NULL
        );
        ",
    )
    .map_err(|e| BoardsyncError::Database(format!("Migration v1 failed: {e}")))
}

/// Migration v2: kanban boards.
///
/// Columns and their item order per project.
fn migrate_v2(conn: &Connection) -> Result<(), BoardsyncError> {
    conn.execute_batch(
        r"
        CREATE TABLE IF NOT EXISTS board_columns (
            project_id INTEGER NOT NULL,
            id TEXT NOT NULL,
            title TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (project_id, id)
        );

        CREATE TABLE IF NOT EXISTS board_items (
            project_id INTEGER NOT NULL,
            column_id TEXT NOT NULL,
            item_id TEXT NOT NULL,
            position INTEGER NOT NULL,
            PRIMARY KEY (project_id, item_id),
            FOREIGN KEY (project_id, column_id)
                REFERENCES board_columns(project_id, id) ON DELETE CASCADE
        );
        ",
    )
    .map_err(|e| BoardsyncError::Database(format!("Migration v2 failed: {e}")))
}
