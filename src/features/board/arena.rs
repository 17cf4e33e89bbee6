//! Kanban board held as an arena of columns indexed by id.
//!
//! Moving a card is one command, validated completely before the board is
//! touched, so a rejected move leaves every column as it was.

use std::collections::HashMap;

use serde::{Serialize, Serializer};

use crate::core::{ColumnId, ItemId};
use crate::error::BoardsyncError;
use crate::features::sync::MoveTask;

/// A column and the ordered cards in it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub id: ColumnId,
    pub title: String,
    pub items: Vec<ItemId>,
}

impl Column {
    #[must_use]
    pub fn position_of(&self, item: &ItemId) -> Option<usize> {
        self.items.iter().position(|i| i == item)
    }
}

/// The board of one project.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Board {
    project_id: i64,
    columns: HashMap<ColumnId, Column>,
    column_order: Vec<ColumnId>,
}

impl Board {
    #[must_use]
    pub fn new(project_id: i64) -> Self {
        Self {
            project_id,
            columns: HashMap::new(),
            column_order: Vec::new(),
        }
    }

    #[must_use]
    pub const fn project_id(&self) -> i64 {
        self.project_id
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.column_order.is_empty()
    }

    /// Append a column.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if a column with this id exists.
    pub fn add_column(&mut self, id: ColumnId, title: &str) -> Result<(), BoardsyncError> {
        if self.columns.contains_key(&id) {
            return Err(BoardsyncError::InvalidInput(format!(
                "column '{id}' already exists on project {}",
                self.project_id
            )));
        }

        self.column_order.push(id.clone());
        self.columns.insert(
            id.clone(),
            Column {
                id,
                title: title.to_string(),
                items: Vec::new(),
            },
        );
        Ok(())
    }

    /// Place a new card in `column`, at `index` or at the end.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` for an unknown column and `InvalidInput` if the card
    /// is already on the board or the index is out of range.
    pub fn add_item(
        &mut self,
        column: &ColumnId,
        item: ItemId,
        index: Option<usize>,
    ) -> Result<(), BoardsyncError> {
        if let Some((existing, _)) = self.locate(&item) {
            return Err(BoardsyncError::InvalidInput(format!(
                "item '{item}' is already in column '{existing}'"
            )));
        }

        let target = self
            .columns
            .get_mut(column)
            .ok_or_else(|| BoardsyncError::NotFound(format!("column '{column}'")))?;

        let index = index.unwrap_or(target.items.len());
        if index > target.items.len() {
            return Err(BoardsyncError::InvalidInput(format!(
                "index {index} is out of range for column '{column}' ({} items)",
                target.items.len()
            )));
        }

        target.items.insert(index, item);
        Ok(())
    }

    #[must_use]
    pub fn column(&self, id: &ColumnId) -> Option<&Column> {
        self.columns.get(id)
    }

    /// Columns in display order.
    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.column_order
            .iter()
            .filter_map(|id| self.columns.get(id))
    }

    /// Find the column holding `item` and its position there.
    #[must_use]
    pub fn locate(&self, item: &ItemId) -> Option<(&ColumnId, usize)> {
        self.columns()
            .find_map(|c| c.position_of(item).map(|pos| (&c.id, pos)))
    }

    /// Move `item` from `from` to position `index` of `to`.
    ///
    /// `index` is counted after the card has been taken out of `from`, so it
    /// ranges over `0..=len` of the destination. On success the board is
    /// updated and the mutation to queue is returned.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if either column is unknown or the card is not in
    /// `from`, and `InvalidInput` if `index` is out of range. The board is
    /// unchanged on error.
    pub fn move_item(
        &mut self,
        item: &ItemId,
        from: &ColumnId,
        to: &ColumnId,
        index: usize,
    ) -> Result<MoveTask, BoardsyncError> {
        let source = self
            .columns
            .get(from)
            .ok_or_else(|| BoardsyncError::NotFound(format!("column '{from}'")))?;
        let destination = self
            .columns
            .get(to)
            .ok_or_else(|| BoardsyncError::NotFound(format!("column '{to}'")))?;

        let position = source.position_of(item).ok_or_else(|| {
            BoardsyncError::NotFound(format!("item '{item}' in column '{from}'"))
        })?;

        let available = if from == to {
            destination.items.len() - 1
        } else {
            destination.items.len()
        };
        if index > available {
            return Err(BoardsyncError::InvalidInput(format!(
                "index {index} is out of range for column '{to}' (max {available})"
            )));
        }

        // Validated; both lookups below succeed.
        if let Some(source) = self.columns.get_mut(from) {
            source.items.remove(position);
        }
        if let Some(destination) = self.columns.get_mut(to) {
            destination.items.insert(index, item.clone());
        }

        Ok(MoveTask {
            project_id: self.project_id,
            task_id: item.clone(),
            from_column: from.clone(),
            to_column: to.clone(),
            index,
        })
    }
}

#[derive(Serialize)]
struct BoardView<'a> {
    project_id: i64,
    columns: Vec<&'a Column>,
}

impl Serialize for Board {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        BoardView {
            project_id: self.project_id,
            columns: self.columns().collect(),
        }
        .serialize(serializer)
    }
}
