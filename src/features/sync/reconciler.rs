//! Drains the queue against the remote endpoint.
//!
//! Entries are submitted strictly in queue order. A transient failure halts
//! the pass so a later entry is never applied before an earlier one that is
//! still pending. Permanent rejections are dead-lettered and the pass moves on.

use colored::Colorize;
use serde::Serialize;

use super::entry::FailOutcome;
use super::lock::DrainLock;
use super::queue::SyncQueue;
use crate::core::EntryId;
use crate::error::BoardsyncError;
use crate::remote::{RemoteEndpoint, RemoteFailure};

/// What a single drain pass did.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DrainReport {
    /// Entries acknowledged by the server and removed
    pub delivered: Vec<EntryId>,
    /// Entries moved to the dead-letter table
    pub dead_lettered: Vec<EntryId>,
    /// Entry whose transient failure stopped the pass
    pub failed: Option<EntryId>,
    /// Whether the pass stopped before reaching the end of the queue
    pub halted: bool,
    /// Entries still queued afterwards
    pub remaining: usize,
}

impl DrainReport {
    /// Number of entries the pass submitted.
    #[must_use]
    pub fn attempted(&self) -> usize {
        self.delivered.len()
            + self
                .dead_lettered
                .iter()
                .filter(|id| Some(*id) != self.failed.as_ref())
                .count()
            + usize::from(self.failed.is_some())
    }

    /// Whether the pass emptied the queue.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        !self.halted && self.remaining == 0
    }
}

/// Result of asking for a drain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum DrainOutcome {
    /// Another drain held the lock; this trigger was dropped.
    Skipped,
    /// The pass ran.
    Completed(DrainReport),
}

impl DrainOutcome {
    #[must_use]
    pub const fn report(&self) -> Option<&DrainReport> {
        match self {
            Self::Skipped => None,
            Self::Completed(report) => Some(report),
        }
    }

    #[must_use]
    pub const fn is_skipped(&self) -> bool {
        matches!(self, Self::Skipped)
    }
}

/// Owns the remote endpoint and the drain lock.
pub struct Reconciler<R> {
    remote: R,
    lock: DrainLock,
}

impl<R: RemoteEndpoint> Reconciler<R> {
    #[must_use]
    pub const fn new(remote: R) -> Self {
        Self {
            remote,
            lock: DrainLock::new(),
        }
    }

    /// Whether a drain is running right now.
    #[must_use]
    pub fn is_draining(&self) -> bool {
        self.lock.is_held()
    }

    /// Run one drain pass over `queue`.
    ///
    /// Returns [`DrainOutcome::Skipped`] without touching the queue if a drain
    /// is already running.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails. Remote failures are recorded
    /// in the queue and never returned.
    pub fn drain(&self, queue: &SyncQueue) -> Result<DrainOutcome, BoardsyncError> {
        let Some(_guard) = self.lock.try_acquire() else {
            tracing::debug!("drain already running, skipping trigger");
            return Ok(DrainOutcome::Skipped);
        };

        queue.recover_stale_in_flight()?;
        let pending = queue.list_pending()?;
        let mut report = DrainReport::default();

        if pending.is_empty() {
            tracing::debug!("nothing to drain");
            return Ok(DrainOutcome::Completed(report));
        }

        tracing::info!(count = pending.len(), "draining queue");

        for entry in pending {
            queue.mark_in_flight(&entry.id)?;
            tracing::debug!(id = %entry.id, kind = entry.payload.display_name(), "submitting");

            match self.remote.submit(&entry.id, &entry.payload) {
                Ok(ack) => {
                    queue.resolve(&entry.id)?;
                    tracing::debug!(id = %entry.id, status = ack.status, "acknowledged");
                    report.delivered.push(entry.id);
                },
                Err(RemoteFailure::Permanent { status, reason }) => {
                    queue.dead_letter(&entry.id, &reason, status)?;
                    report.dead_lettered.push(entry.id);
                },
                Err(RemoteFailure::Transient(error)) => {
                    tracing::warn!(id = %entry.id, %error, "transient failure, halting drain");
                    if queue.mark_failed(&entry.id, &error)? == FailOutcome::DeadLettered {
                        report.dead_lettered.push(entry.id.clone());
                    }
                    report.failed = Some(entry.id);
                    report.halted = true;
                    break;
                },
            }
        }

        report.remaining = queue.pending_count()?;

        tracing::info!(
            delivered = report.delivered.len(),
            dead_lettered = report.dead_lettered.len(),
            halted = report.halted,
            remaining = report.remaining,
            "drain finished"
        );

        Ok(DrainOutcome::Completed(report))
    }
}

/// Format a drain outcome for display.
#[must_use]
pub fn format_drain_outcome(outcome: &DrainOutcome) -> String {
    let report = match outcome {
        DrainOutcome::Skipped => {
            return format!("{} Sync already in progress", "○".yellow());
        },
        DrainOutcome::Completed(report) => report,
    };

    let mut lines = Vec::new();

    lines.push(format!("Sync completed: {} entries", report.attempted()));
    lines.push("─".repeat(40));

    if !report.delivered.is_empty() {
        lines.push(format!(
            "  {} {}",
            "✓".green(),
            format!("{} delivered", report.delivered.len()).green()
        ));
    }

    if !report.dead_lettered.is_empty() {
        lines.push(format!(
            "  {} {}",
            "✗".red(),
            format!("{} dead-lettered", report.dead_lettered.len()).red()
        ));
    }

    if let Some(id) = &report.failed {
        lines.push(format!(
            "  {} {}",
            "○".yellow(),
            format!("halted at {id}, will retry").yellow()
        ));
    }

    lines.push(String::new());
    lines.push(format!("{} still queued", report.remaining));

    lines.join("\n")
}
