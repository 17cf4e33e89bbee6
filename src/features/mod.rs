//! Feature implementations for boardsync.
//!
//! - Offline write queue and reconciliation
//! - Kanban boards with queued card moves

pub mod board;
pub mod sync;
