//! Core types shared across boardsync features.

mod ids;

pub use ids::{ColumnId, EntryId, ItemId};
