//! Board persistence.
//!
//! A board is saved as a whole: its columns and card positions are replaced
//! in one transaction, so a crash never leaves a half-applied move on disk.

use rusqlite::{params, Transaction};

use super::arena::Board;
use crate::core::{ColumnId, ItemId};
use crate::error::BoardsyncError;
use crate::storage::Database;

/// Storage for kanban boards.
pub struct BoardStore<'a> {
    db: &'a Database,
}

impl<'a> BoardStore<'a> {
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Load the board of a project. A project without columns yields an empty board.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails or stored ids are malformed.
    pub fn load(&self, project_id: i64) -> Result<Board, BoardsyncError> {
        let conn = self.db.connection();
        let mut board = Board::new(project_id);

        let mut stmt = conn
            .prepare("SELECT id, title FROM board_columns WHERE project_id = ?1 ORDER BY position")
            .map_err(|e| BoardsyncError::Database(format!("Failed to prepare query: {e}")))?;
        let columns = stmt
            .query_map([project_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| BoardsyncError::Database(format!("Failed to query columns: {e}")))?;

        for row in columns {
            let (id, title) = row.map_err(|e| BoardsyncError::Database(e.to_string()))?;
            board.add_column(ColumnId::parse(&id)?, &title)?;
        }

        let mut stmt = conn
            .prepare(
                "SELECT column_id, item_id FROM board_items
                 WHERE project_id = ?1 ORDER BY column_id, position",
            )
            .map_err(|e| BoardsyncError::Database(format!("Failed to prepare query: {e}")))?;
        let items = stmt
            .query_map([project_id], |row| {
                Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
            })
            .map_err(|e| BoardsyncError::Database(format!("Failed to query items: {e}")))?;

        for row in items {
            let (column, item) = row.map_err(|e| BoardsyncError::Database(e.to_string()))?;
            board.add_item(&ColumnId::parse(&column)?, ItemId::parse(&item)?, None)?;
        }

        Ok(board)
    }

    /// Replace the stored board of `board.project_id()`.
    ///
    /// # Errors
    ///
    /// Returns an error if the write fails; the previous board is kept then.
    pub fn save(&self, board: &Board) -> Result<(), BoardsyncError> {
        let tx = self.db.transaction()?;
        Self::save_in(&tx, board)?;

        tx.commit()
            .map_err(|e| BoardsyncError::Database(format!("Failed to commit board: {e}")))?;

        tracing::debug!(project_id = board.project_id(), "board saved");
        Ok(())
    }

    /// Write `board` inside a caller's transaction, so it commits together
    /// with the mutation that describes the change.
    ///
    /// # Errors
    ///
    /// Returns an error if a write fails.
    pub fn save_in(tx: &Transaction<'_>, board: &Board) -> Result<(), BoardsyncError> {
        let project_id = board.project_id();

        tx.execute("DELETE FROM board_columns WHERE project_id = ?1", [project_id])
            .map_err(|e| BoardsyncError::Database(format!("Failed to clear board: {e}")))?;

        for (position, column) in board.columns().enumerate() {
            tx.execute(
                "INSERT INTO board_columns (project_id, id, title, position) VALUES (?1, ?2, ?3, ?4)",
                params![project_id, column.id.as_str(), column.title, position],
            )
            .map_err(|e| BoardsyncError::Database(format!("Failed to save column: {e}")))?;

            for (item_position, item) in column.items.iter().enumerate() {
                tx.execute(
                    "INSERT INTO board_items (project_id, column_id, item_id, position)
                     VALUES (?1, ?2, ?3, ?4)",
                    params![project_id, column.id.as_str(), item.as_str(), item_position],
                )
                .map_err(|e| BoardsyncError::Database(format!("Failed to save item: {e}")))?;
            }
        }

        Ok(())
    }
}
