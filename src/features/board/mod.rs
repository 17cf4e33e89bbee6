//! Kanban boards.
//!
//! Card moves are applied locally as single commands and queued through the
//! sync client as `move_task` mutations.

pub mod arena;
pub mod storage;

pub use arena::{Board, Column};
pub use storage::BoardStore;
