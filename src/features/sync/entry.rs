//! Queue entry and dead-letter records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::mutation::Mutation;
use crate::core::EntryId;

/// Delivery status of a queued entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    /// Waiting to be submitted
    Pending,
    /// Submitted, outcome not yet recorded
    InFlight,
    /// Last submission failed transiently; will be retried
    Failed,
}

impl EntryStatus {
    /// Convert from the stored representation.
    ///
    /// Unknown values map to `Pending` so the entry is retried rather than lost.
    #[must_use]
    pub fn from_db(s: &str) -> Self {
        match s {
            "in_flight" => Self::InFlight,
            "failed" => Self::Failed,
            _ => Self::Pending,
        }
    }

    /// Stored representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InFlight => "in_flight",
            Self::Failed => "failed",
        }
    }
}

impl std::fmt::Display for EntryStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A pending mutation with delivery metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueEntry {
    /// Local key and server idempotency key
    pub id: EntryId,
    /// The mutation to deliver
    pub payload: Mutation,
    /// When the entry was queued
    pub created_at: DateTime<Utc>,
    /// Number of failed submission attempts
    pub attempts: u32,
    /// Current status
    pub status: EntryStatus,
    /// Last attempt timestamp
    pub last_attempt: Option<DateTime<Utc>>,
    /// Last error message
    pub last_error: Option<String>,
}

/// Why an entry left the retry path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeadLetterKind {
    /// The server permanently rejected it
    Rejected,
    /// It failed transiently `max_attempts` times
    Exhausted,
}

impl DeadLetterKind {
    #[must_use]
    pub fn from_db(s: &str) -> Self {
        match s {
            "exhausted" => Self::Exhausted,
            _ => Self::Rejected,
        }
    }

    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Rejected => "rejected",
            Self::Exhausted => "exhausted",
        }
    }
}

impl std::fmt::Display for DeadLetterKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A mutation that will not be retried automatically.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeadLetter {
    pub id: EntryId,
    pub payload: Mutation,
    pub created_at: DateTime<Utc>,
    pub attempts: u32,
    pub failed_at: DateTime<Utc>,
    pub reason: String,
    /// HTTP status of a permanent rejection
    pub status_code: Option<u16>,
    pub kind: DeadLetterKind,
}

/// Result of recording a transient failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailOutcome {
    /// The entry stays queued and will be retried.
    WillRetry {
        /// Attempts recorded so far
        attempts: u32,
    },
    /// The retry cap was reached; the entry moved to the dead-letter table.
    DeadLettered,
    /// The entry no longer exists.
    Missing,
}
