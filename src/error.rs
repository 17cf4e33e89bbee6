//! Error types for boardsync.

use thiserror::Error;

/// Errors surfaced by the boardsync library and CLI.
///
/// Remote delivery failures are not represented here: the reconciler
/// classifies them as [`crate::remote::RemoteFailure`] values and keeps them
/// inside the queue. Everything in this enum reaches the caller.
#[derive(Debug, Error)]
pub enum BoardsyncError {
    /// Local storage failed (open, migrate, query, quota).
    #[error("Database error: {0}")]
    Database(String),

    /// Configuration could not be read, parsed or written.
    #[error("Configuration error: {0}")]
    Config(String),

    /// A queue entry, dead letter, board or column does not exist.
    #[error("Not found: {0}")]
    NotFound(String),

    /// A command was given arguments it cannot act on.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// The remote endpoint could not be set up or reached for a direct call.
    #[error("Remote error: {0}")]
    Remote(String),

    /// JSON (de)serialization failed.
    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Filesystem I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl BoardsyncError {
    /// Whether the error came from local storage.
    ///
    /// Used by the CLI to warn that a mutation was not queued.
    #[must_use]
    pub const fn is_storage(&self) -> bool {
        matches!(self, Self::Database(_) | Self::Io(_))
    }
}

impl From<rusqlite::Error> for BoardsyncError {
    fn from(err: rusqlite::Error) -> Self {
        Self::Database(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_messages() {
        let err = BoardsyncError::NotFound("entry abc".to_string());
        assert_eq!(err.to_string(), "Not found: entry abc");

        let err = BoardsyncError::Database("disk full".to_string());
        assert_eq!(err.to_string(), "Database error: disk full");
    }

    #[test]
    fn test_is_storage() {
        assert!(BoardsyncError::Database("x".to_string()).is_storage());
        assert!(!BoardsyncError::Config("x".to_string()).is_storage());
    }

    #[test]
    fn test_from_rusqlite() {
        let err: BoardsyncError = rusqlite::Error::QueryReturnedNoRows.into();
        assert!(matches!(err, BoardsyncError::Database(_)));
    }
}
