//! Output formatting for boardsync.
//!
//! This module provides formatters for displaying queue state and boards in various formats.

mod json;
mod pretty;

use crate::cli::args::OutputFormat;
use crate::core::EntryId;
use crate::error::BoardsyncError;
use crate::features::board::Board;
use crate::features::sync::{
    format_drain_outcome, DeadLetter, DrainOutcome, Mutation, QueueEntry, QueueStats,
};

pub use json::*;
pub use pretty::*;

/// Format queue entries based on output format
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_entries(
    entries: &[QueueEntry],
    format: OutputFormat,
) -> Result<String, BoardsyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_entries_pretty(entries)),
        OutputFormat::Json => format_entries_json(entries),
    }
}

/// Format dead letters based on output format
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_dead_letters(
    letters: &[DeadLetter],
    format: OutputFormat,
) -> Result<String, BoardsyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_dead_letters_pretty(letters)),
        OutputFormat::Json => format_dead_letters_json(letters),
    }
}

/// Format queue statistics based on output format
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_status(stats: &QueueStats, format: OutputFormat) -> Result<String, BoardsyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_status_pretty(stats)),
        OutputFormat::Json => format_status_json(stats),
    }
}

/// Format a drain outcome based on output format
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_drain(outcome: &DrainOutcome, format: OutputFormat) -> Result<String, BoardsyncError> {
    match format {
        OutputFormat::Pretty => match outcome.report() {
            Some(report) if report.attempted() == 0 => Ok("Nothing to sync.".to_string()),
            _ => Ok(format_drain_outcome(outcome)),
        },
        OutputFormat::Json => to_json(outcome),
    }
}

/// Format a queued mutation confirmation based on output format
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_queued(
    id: &EntryId,
    mutation: &Mutation,
    pending: usize,
    format: OutputFormat,
) -> Result<String, BoardsyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_queued_pretty(id, mutation, pending)),
        OutputFormat::Json => format_queued_json(id, mutation, pending),
    }
}

/// Format a board based on output format
///
/// # Errors
///
/// Returns `BoardsyncError::Parse` if JSON serialization fails.
pub fn format_board(board: &Board, format: OutputFormat) -> Result<String, BoardsyncError> {
    match format {
        OutputFormat::Pretty => Ok(format_board_pretty(board)),
        OutputFormat::Json => format_board_json(board),
    }
}
