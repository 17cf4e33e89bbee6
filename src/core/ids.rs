//! Identifier newtypes.

use std::fmt;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::BoardsyncError;

const MAX_ID_LENGTH: usize = 128;

/// Identifier of a queue entry.
///
/// Generated once, locally, before any network attempt, and sent as the
/// idempotency key on every retry.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(String);

impl EntryId {
    /// Generate a fresh random id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Accept an id produced elsewhere on this client.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` if the id is empty, longer than 128 characters,
    /// or contains anything other than ASCII alphanumerics, `-` and `_`.
    pub fn parse(id: &str) -> Result<Self, BoardsyncError> {
        validate("entry id", id).map(|()| Self(id.to_string()))
    }

    /// The id as sent on the wire.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a kanban column within a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnId(String);

impl ColumnId {
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty or malformed ids.
    pub fn parse(id: &str) -> Result<Self, BoardsyncError> {
        validate("column id", id).map(|()| Self(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ColumnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a card (task) on a board.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ItemId(String);

impl ItemId {
    /// # Errors
    ///
    /// Returns `InvalidInput` for empty or malformed ids.
    pub fn parse(id: &str) -> Result<Self, BoardsyncError> {
        validate("item id", id).map(|()| Self(id.to_string()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

fn validate(what: &str, id: &str) -> Result<(), BoardsyncError> {
    if id.is_empty() {
        return Err(BoardsyncError::InvalidInput(format!("{what} cannot be empty")));
    }
    if id.len() > MAX_ID_LENGTH {
        return Err(BoardsyncError::InvalidInput(format!(
            "{what} exceeds {MAX_ID_LENGTH} characters"
        )));
    }
    if !id
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
    {
        return Err(BoardsyncError::InvalidInput(format!(
            "{what} '{id}' contains invalid characters (allowed: a-z, A-Z, 0-9, -, _)"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_unique_and_valid() {
        let a = EntryId::generate();
        let b = EntryId::generate();
        assert_ne!(a, b);
        assert!(EntryId::parse(a.as_str()).is_ok());
    }

    #[test]
    fn test_parse_rejects_bad_ids() {
        assert!(EntryId::parse("").is_err());
        assert!(EntryId::parse("has space").is_err());
        assert!(EntryId::parse(&"a".repeat(129)).is_err());
        assert!(ColumnId::parse("in/progress").is_err());
    }

    #[test]
    fn test_parse_accepts_short_ids() {
        assert_eq!(EntryId::parse("x1").unwrap().as_str(), "x1");
        assert_eq!(ColumnId::parse("inProgress").unwrap().to_string(), "inProgress");
        assert_eq!(ItemId::parse("task_1").unwrap().as_str(), "task_1");
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let id = EntryId::parse("x1").unwrap();
        assert_eq!(serde_json::to_string(&id).unwrap(), "\"x1\"");
    }
}
