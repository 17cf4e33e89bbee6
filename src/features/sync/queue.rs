//! Local durable queue of pending mutations.
//!
//! Every mutation is written here before any network attempt. Entries leave
//! the `sync_queue` table only when the server acknowledges them, or when
//! they are moved to `dead_letters` (permanent rejection or retry cap).

use chrono::{DateTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{ffi, params, Connection, OptionalExtension, Row, Transaction};

use super::entry::{DeadLetter, DeadLetterKind, EntryStatus, FailOutcome, QueueEntry};
use super::mutation::Mutation;
use crate::core::EntryId;
use crate::error::BoardsyncError;
use crate::storage::Database;

const DEFAULT_MAX_ATTEMPTS: u32 = 5;

const ENTRY_COLUMNS: &str =
    "id, payload, created_at, attempts, status, last_attempt, last_error";

const DEAD_LETTER_COLUMNS: &str =
    "id, payload, created_at, attempts, failed_at, reason, status_code, kind";

/// Durable queue of mutations awaiting delivery.
pub struct SyncQueue {
    db: Database,
    max_attempts: u32,
}

impl SyncQueue {
    /// Create a queue over an open database.
    #[must_use]
    pub const fn with_database(db: Database) -> Self {
        Self {
            db,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }

    /// Set the number of failed attempts after which an entry is dead-lettered.
    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    /// The configured retry cap.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// The underlying database, shared with other local stores.
    #[must_use]
    pub const fn database(&self) -> &Database {
        &self.db
    }

    /// Queue a mutation under a freshly generated id.
    ///
    /// Returns only after the entry is committed.
    ///
    /// # Errors
    ///
    /// Returns an error if the entry cannot be persisted. The mutation is not
    /// queued in that case and the caller must surface it.
    pub fn enqueue(&self, payload: &Mutation) -> Result<EntryId, BoardsyncError> {
        self.enqueue_with_id(EntryId::generate(), payload)
    }

    /// Queue a mutation under an id generated earlier on this client.
    ///
    /// # Errors
    ///
    /// Returns an error if the id is already queued or the entry cannot be persisted.
    pub fn enqueue_with_id(
        &self,
        id: EntryId,
        payload: &Mutation,
    ) -> Result<EntryId, BoardsyncError> {
        insert_entry(self.db.connection(), &id, payload, Utc::now())?;
        tracing::debug!(id = %id, kind = payload.display_name(), "queued mutation");
        Ok(id)
    }

    /// Queue a mutation inside a caller's transaction.
    ///
    /// The entry becomes visible only when `tx` commits, together with
    /// whatever else the caller wrote in it.
    ///
    /// # Errors
    ///
    /// Returns an error if the insert fails; the caller should drop `tx`.
    pub fn enqueue_in(tx: &Transaction<'_>, payload: &Mutation) -> Result<EntryId, BoardsyncError> {
        let id = EntryId::generate();
        insert_entry(tx, &id, payload, Utc::now())?;
        tracing::debug!(id = %id, kind = payload.display_name(), "queued mutation in transaction");
        Ok(id)
    }

    /// Entries awaiting delivery (`pending` or `failed`), oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_pending(&self) -> Result<Vec<QueueEntry>, BoardsyncError> {
        self.query_entries(
            &format!(
                "SELECT {ENTRY_COLUMNS} FROM sync_queue
                 WHERE status IN ('pending', 'failed')
                 ORDER BY seq ASC"
            ),
            [],
        )
    }

    /// Every entry still in the queue, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_all(&self) -> Result<Vec<QueueEntry>, BoardsyncError> {
        self.query_entries(
            &format!("SELECT {ENTRY_COLUMNS} FROM sync_queue ORDER BY seq ASC"),
            [],
        )
    }

    /// Get a specific entry by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get(&self, id: &EntryId) -> Result<Option<QueueEntry>, BoardsyncError> {
        fetch_entry(self.db.connection(), id)
    }

    /// Mark an entry as submitted. A missing entry is ignored.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_in_flight(&self, id: &EntryId) -> Result<(), BoardsyncError> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE sync_queue SET status = 'in_flight', last_attempt = ?1 WHERE id = ?2",
                params![timestamp(Utc::now()), id.as_str()],
            )
            .map_err(|e| BoardsyncError::Database(format!("Failed to mark entry in flight: {e}")))?;

        if rows == 0 {
            tracing::debug!(id = %id, "entry already resolved, not marking in flight");
        }
        Ok(())
    }

    /// Remove an acknowledged entry. Removing an absent id is not an error.
    ///
    /// Returns whether an entry was removed.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn resolve(&self, id: &EntryId) -> Result<bool, BoardsyncError> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM sync_queue WHERE id = ?1", [id.as_str()])
            .map_err(|e| BoardsyncError::Database(format!("Failed to resolve entry: {e}")))?;

        Ok(rows > 0)
    }

    /// Record a transient failure.
    ///
    /// Increments `attempts` and sets the status to `failed`. Once `attempts`
    /// reaches the retry cap the entry is moved to the dead-letter table in the
    /// same transaction.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn mark_failed(&self, id: &EntryId, error: &str) -> Result<FailOutcome, BoardsyncError> {
        let tx = self.db.transaction()?;
        let now = Utc::now();

        let rows = tx
            .execute(
                r"UPDATE sync_queue SET
                  status = 'failed',
                  last_attempt = ?1,
                  last_error = ?2,
                  attempts = attempts + 1
                  WHERE id = ?3",
                params![timestamp(now), error, id.as_str()],
            )
            .map_err(|e| BoardsyncError::Database(format!("Failed to mark entry failed: {e}")))?;

        if rows == 0 {
            return Ok(FailOutcome::Missing);
        }

        let Some(entry) = fetch_entry(&tx, id)? else {
            return Ok(FailOutcome::Missing);
        };

        let outcome = if entry.attempts >= self.max_attempts {
            let reason = format!("gave up after {} attempts: {error}", entry.attempts);
            move_to_dead_letters(&tx, &entry, &reason, None, DeadLetterKind::Exhausted, now)?;
            FailOutcome::DeadLettered
        } else {
            FailOutcome::WillRetry {
                attempts: entry.attempts,
            }
        };

        tx.commit()
            .map_err(|e| BoardsyncError::Database(format!("Failed to commit failure: {e}")))?;

        Ok(outcome)
    }

    /// Move an entry the server permanently rejected to the dead-letter table.
    ///
    /// Returns whether the entry existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the move fails; the entry is left untouched then.
    pub fn dead_letter(
        &self,
        id: &EntryId,
        reason: &str,
        status_code: Option<u16>,
    ) -> Result<bool, BoardsyncError> {
        let tx = self.db.transaction()?;

        let Some(entry) = fetch_entry(&tx, id)? else {
            return Ok(false);
        };

        move_to_dead_letters(
            &tx,
            &entry,
            reason,
            status_code,
            DeadLetterKind::Rejected,
            Utc::now(),
        )?;

        tx.commit()
            .map_err(|e| BoardsyncError::Database(format!("Failed to commit dead letter: {e}")))?;

        Ok(true)
    }

    /// Revert every `in_flight` entry to `pending`.
    ///
    /// Called at startup and at the beginning of every drain: an entry can
    /// only be in flight while a drain holds the lock.
    ///
    /// # Errors
    ///
    /// Returns an error if the update fails.
    pub fn recover_stale_in_flight(&self) -> Result<usize, BoardsyncError> {
        let rows = self
            .db
            .connection()
            .execute(
                "UPDATE sync_queue SET status = 'pending' WHERE status = 'in_flight'",
                [],
            )
            .map_err(|e| {
                BoardsyncError::Database(format!("Failed to recover in-flight entries: {e}"))
            })?;

        if rows > 0 {
            tracing::info!(count = rows, "recovered stale in-flight entries");
        }
        Ok(rows)
    }

    /// Number of entries not yet resolved.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn pending_count(&self) -> Result<usize, BoardsyncError> {
        let count: i64 = self
            .db
            .connection()
            .query_row("SELECT COUNT(*) FROM sync_queue", [], |row| row.get(0))
            .map_err(|e| BoardsyncError::Database(format!("Failed to count entries: {e}")))?;

        Ok(usize::try_from(count).unwrap_or(0))
    }

    /// Get queue statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn stats(&self) -> Result<QueueStats, BoardsyncError> {
        let conn = self.db.connection();

        let count_status = |status: EntryStatus| -> Result<usize, BoardsyncError> {
            let n: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sync_queue WHERE status = ?1",
                    [status.as_str()],
                    |row| row.get(0),
                )
                .map_err(|e| BoardsyncError::Database(format!("Failed to count {status}: {e}")))?;
            Ok(usize::try_from(n).unwrap_or(0))
        };

        let dead_letters: i64 = conn
            .query_row("SELECT COUNT(*) FROM dead_letters", [], |row| row.get(0))
            .map_err(|e| BoardsyncError::Database(format!("Failed to count dead letters: {e}")))?;

        let oldest_pending: Option<String> = conn
            .query_row(
                "SELECT created_at FROM sync_queue ORDER BY seq ASC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()
            .map_err(|e| BoardsyncError::Database(format!("Failed to get oldest entry: {e}")))?;

        Ok(QueueStats {
            pending: count_status(EntryStatus::Pending)?,
            in_flight: count_status(EntryStatus::InFlight)?,
            failed: count_status(EntryStatus::Failed)?,
            dead_letters: usize::try_from(dead_letters).unwrap_or(0),
            oldest_pending: oldest_pending.as_deref().and_then(parse_timestamp),
        })
    }

    /// Dead-lettered entries, most recent failure first.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn list_dead_letters(&self) -> Result<Vec<DeadLetter>, BoardsyncError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(&format!(
                "SELECT {DEAD_LETTER_COLUMNS} FROM dead_letters ORDER BY failed_at DESC"
            ))
            .map_err(|e| BoardsyncError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map([], row_to_dead_letter)
            .map_err(|e| BoardsyncError::Database(format!("Failed to query dead letters: {e}")))?;

        let mut letters = Vec::new();
        for row in rows {
            letters.push(row.map_err(|e| BoardsyncError::Database(e.to_string()))?);
        }

        Ok(letters)
    }

    /// Get a dead letter by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the query fails.
    pub fn get_dead_letter(&self, id: &EntryId) -> Result<Option<DeadLetter>, BoardsyncError> {
        fetch_dead_letter(self.db.connection(), id)
    }

    /// Drop a dead letter permanently.
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn discard_dead_letter(&self, id: &EntryId) -> Result<bool, BoardsyncError> {
        let rows = self
            .db
            .connection()
            .execute("DELETE FROM dead_letters WHERE id = ?1", [id.as_str()])
            .map_err(|e| BoardsyncError::Database(format!("Failed to discard dead letter: {e}")))?;

        Ok(rows > 0)
    }

    /// Move a dead letter back into the queue, optionally with an edited payload.
    ///
    /// The resubmission is a new logical operation and gets a fresh id.
    ///
    /// # Errors
    ///
    /// Returns `NotFound` if there is no such dead letter, or a database error.
    pub fn requeue_dead_letter(
        &self,
        id: &EntryId,
        replacement: Option<Mutation>,
    ) -> Result<EntryId, BoardsyncError> {
        let tx = self.db.transaction()?;

        let letter = fetch_dead_letter(&tx, id)?
            .ok_or_else(|| BoardsyncError::NotFound(format!("dead letter {id}")))?;

        tx.execute("DELETE FROM dead_letters WHERE id = ?1", [id.as_str()])
            .map_err(|e| BoardsyncError::Database(format!("Failed to remove dead letter: {e}")))?;

        let new_id = EntryId::generate();
        let payload = replacement.unwrap_or(letter.payload);
        insert_entry(&tx, &new_id, &payload, Utc::now())?;

        tx.commit()
            .map_err(|e| BoardsyncError::Database(format!("Failed to commit requeue: {e}")))?;

        tracing::info!(old = %id, new = %new_id, "requeued dead letter");
        Ok(new_id)
    }

    /// Clear all entries and dead letters (for reset).
    ///
    /// # Errors
    ///
    /// Returns an error if the delete fails.
    pub fn clear(&self) -> Result<(), BoardsyncError> {
        self.db
            .connection()
            .execute_batch("DELETE FROM sync_queue; DELETE FROM dead_letters;")
            .map_err(|e| BoardsyncError::Database(format!("Failed to clear queue: {e}")))
    }

    fn query_entries<P: rusqlite::Params>(
        &self,
        sql: &str,
        params: P,
    ) -> Result<Vec<QueueEntry>, BoardsyncError> {
        let conn = self.db.connection();
        let mut stmt = conn
            .prepare(sql)
            .map_err(|e| BoardsyncError::Database(format!("Failed to prepare query: {e}")))?;

        let rows = stmt
            .query_map(params, row_to_entry)
            .map_err(|e| BoardsyncError::Database(format!("Failed to query entries: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| BoardsyncError::Database(e.to_string()))?);
        }

        Ok(entries)
    }
}

/// Queue statistics.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueStats {
    /// Entries waiting for their first or next attempt
    pub pending: usize,
    /// Entries submitted in the current drain
    pub in_flight: usize,
    /// Entries whose last attempt failed transiently
    pub failed: usize,
    /// Entries removed from the retry path
    pub dead_letters: usize,
    /// Enqueue time of the oldest unresolved entry
    pub oldest_pending: Option<DateTime<Utc>>,
}

impl QueueStats {
    /// Entries not yet resolved.
    #[must_use]
    pub const fn unresolved(&self) -> usize {
        self.pending + self.in_flight + self.failed
    }
}

fn insert_entry(
    conn: &Connection,
    id: &EntryId,
    payload: &Mutation,
    created_at: DateTime<Utc>,
) -> Result<(), BoardsyncError> {
    let json = payload.to_json()?;

    // Never earlier than an entry already queued, even if the clock stepped back.
    let latest: Option<String> = conn
        .query_row("SELECT MAX(created_at) FROM sync_queue", [], |row| row.get(0))
        .map_err(|e| BoardsyncError::Database(format!("Failed to read latest entry: {e}")))?;
    let created_at = latest
        .as_deref()
        .and_then(parse_timestamp)
        .map_or(created_at, |latest| created_at.max(latest));

    conn.execute(
        r"INSERT INTO sync_queue (id, payload, created_at, attempts, status)
          VALUES (?1, ?2, ?3, 0, 'pending')",
        params![id.as_str(), json, timestamp(created_at)],
    )
    .map_err(|e| match e {
        rusqlite::Error::SqliteFailure(err, _)
            if err.extended_code == ffi::SQLITE_CONSTRAINT_UNIQUE
                || err.extended_code == ffi::SQLITE_CONSTRAINT_PRIMARYKEY =>
        {
            BoardsyncError::Database(format!("Entry {id} is already queued"))
        }
        other => BoardsyncError::Database(format!("Failed to enqueue mutation: {other}")),
    })?;

    Ok(())
}

fn move_to_dead_letters(
    conn: &Connection,
    entry: &QueueEntry,
    reason: &str,
    status_code: Option<u16>,
    kind: DeadLetterKind,
    failed_at: DateTime<Utc>,
) -> Result<(), BoardsyncError> {
    conn.execute(
        r"INSERT OR REPLACE INTO dead_letters
          (id, payload, created_at, attempts, failed_at, reason, status_code, kind)
          VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            entry.id.as_str(),
            entry.payload.to_json()?,
            timestamp(entry.created_at),
            entry.attempts,
            timestamp(failed_at),
            reason,
            status_code,
            kind.as_str(),
        ],
    )
    .map_err(|e| BoardsyncError::Database(format!("Failed to record dead letter: {e}")))?;

    conn.execute("DELETE FROM sync_queue WHERE id = ?1", [entry.id.as_str()])
        .map_err(|e| BoardsyncError::Database(format!("Failed to remove entry: {e}")))?;

    tracing::warn!(id = %entry.id, %kind, reason, "entry dead-lettered");
    Ok(())
}

fn fetch_entry(conn: &Connection, id: &EntryId) -> Result<Option<QueueEntry>, BoardsyncError> {
    conn.query_row(
        &format!("SELECT {ENTRY_COLUMNS} FROM sync_queue WHERE id = ?1"),
        [id.as_str()],
        row_to_entry,
    )
    .optional()
    .map_err(|e| BoardsyncError::Database(format!("Failed to query entry: {e}")))
}

fn fetch_dead_letter(
    conn: &Connection,
    id: &EntryId,
) -> Result<Option<DeadLetter>, BoardsyncError> {
    conn.query_row(
        &format!("SELECT {DEAD_LETTER_COLUMNS} FROM dead_letters WHERE id = ?1"),
        [id.as_str()],
        row_to_dead_letter,
    )
    .optional()
    .map_err(|e| BoardsyncError::Database(format!("Failed to query dead letter: {e}")))
}

/// Fixed-width UTC timestamp so lexical order matches time order.
fn timestamp(t: DateTime<Utc>) -> String {
    t.to_rfc3339_opts(SecondsFormat::Micros, true)
}

fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|t| t.with_timezone(&Utc))
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

fn row_id(row: &Row<'_>, idx: usize) -> Result<EntryId, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    EntryId::parse(&raw).map_err(|e| conversion_error(idx, e))
}

fn row_payload(row: &Row<'_>, idx: usize) -> Result<Mutation, rusqlite::Error> {
    let raw: String = row.get(idx)?;
    Mutation::from_json(&raw).map_err(|e| conversion_error(idx, e))
}

fn row_to_entry(row: &Row<'_>) -> Result<QueueEntry, rusqlite::Error> {
    let created_at_str: String = row.get(2)?;
    let status_str: String = row.get(4)?;
    let last_attempt_str: Option<String> = row.get(5)?;

    Ok(QueueEntry {
        id: row_id(row, 0)?,
        payload: row_payload(row, 1)?,
        created_at: parse_timestamp(&created_at_str).unwrap_or_else(Utc::now),
        attempts: row.get(3)?,
        status: EntryStatus::from_db(&status_str),
        last_attempt: last_attempt_str.as_deref().and_then(parse_timestamp),
        last_error: row.get(6)?,
    })
}

fn row_to_dead_letter(row: &Row<'_>) -> Result<DeadLetter, rusqlite::Error> {
    let created_at_str: String = row.get(2)?;
    let failed_at_str: String = row.get(4)?;
    let kind_str: String = row.get(7)?;

    Ok(DeadLetter {
        id: row_id(row, 0)?,
        payload: row_payload(row, 1)?,
        created_at: parse_timestamp(&created_at_str).unwrap_or_else(Utc::now),
        attempts: row.get(3)?,
        failed_at: parse_timestamp(&failed_at_str).unwrap_or_else(Utc::now),
        reason: row.get(5)?,
        status_code: row.get(6)?,
        kind: DeadLetterKind::from_db(&kind_str),
    })
}
