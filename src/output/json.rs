//! JSON output formatting for boardsync.

use serde::Serialize;
use serde_json::json;

use crate::core::EntryId;
use crate::error::BoardsyncError;
use crate::features::board::Board;
use crate::features::sync::{DeadLetter, Mutation, QueueEntry, QueueStats};

/// Format queue entries as JSON
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_entries_json(entries: &[QueueEntry]) -> Result<String, BoardsyncError> {
    let output = json!({
        "count": entries.len(),
        "items": entries
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format dead letters as JSON
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_dead_letters_json(letters: &[DeadLetter]) -> Result<String, BoardsyncError> {
    let output = json!({
        "count": letters.len(),
        "items": letters
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format queue statistics as JSON
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_status_json(stats: &QueueStats) -> Result<String, BoardsyncError> {
    let output = json!({
        "pending": stats.pending,
        "in_flight": stats.in_flight,
        "failed": stats.failed,
        "unresolved": stats.unresolved(),
        "dead_letters": stats.dead_letters,
        "oldest_pending": stats.oldest_pending.map(|t| t.to_rfc3339()),
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a newly queued mutation as JSON
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_queued_json(
    id: &EntryId,
    mutation: &Mutation,
    pending: usize,
) -> Result<String, BoardsyncError> {
    let output = json!({
        "id": id,
        "payload": mutation,
        "pending": pending,
    });
    Ok(serde_json::to_string_pretty(&output)?)
}

/// Format a board as JSON
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_board_json(board: &Board) -> Result<String, BoardsyncError> {
    Ok(serde_json::to_string_pretty(board)?)
}

/// Serialize any value as pretty JSON
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn to_json<T: Serialize>(value: &T) -> Result<String, BoardsyncError> {
    Ok(serde_json::to_string_pretty(value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::features::sync::EntryStatus;
    use chrono::Utc;

    fn entry() -> QueueEntry {
        QueueEntry {
            id: EntryId::parse("x1").unwrap(),
            payload: Mutation::DeleteProject { project_id: 4 },
            created_at: Utc::now(),
            attempts: 2,
            status: EntryStatus::Failed,
            last_attempt: None,
            last_error: Some("timeout".to_string()),
        }
    }

    #[test]
    fn test_format_entries_json() {
        let json = format_entries_json(&[entry()]).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();

        assert_eq!(value["count"], 1);
        assert_eq!(value["items"][0]["id"], "x1");
        assert_eq!(value["items"][0]["status"], "failed");
        assert_eq!(value["items"][0]["payload"]["kind"], "delete_project");
    }

    #[test]
    fn test_format_status_json() {
        let stats = QueueStats {
            pending: 2,
            in_flight: 0,
            failed: 1,
            dead_letters: 3,
            oldest_pending: None,
        };

        let value: serde_json::Value =
            serde_json::from_str(&format_status_json(&stats).unwrap()).unwrap();
        assert_eq!(value["unresolved"], 3);
        assert_eq!(value["dead_letters"], 3);
        assert!(value["oldest_pending"].is_null());
    }

    #[test]
    fn test_format_queued_json() {
        let id = EntryId::parse("abc").unwrap();
        let json = format_queued_json(&id, &Mutation::DeleteProject { project_id: 1 }, 5).unwrap();
        assert!(json.contains("\"id\": \"abc\""));
        assert!(json.contains("\"pending\": 5"));
    }
}
