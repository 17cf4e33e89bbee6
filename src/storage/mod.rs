//! Storage layer for boardsync.
//!
//! This module provides SQLite-based persistence for:
//! - Sync queue (offline mutations awaiting delivery)
//! - Dead letters
//! - Kanban boards

mod database;
mod migrations;

pub use database::Database;
