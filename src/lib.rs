//! boardsync - offline-first sync for kanban project boards
//!
//! Mutations are written to a durable local queue and delivered to the
//! project service in order once it is reachable. Rejected mutations are kept
//! as dead letters for review instead of being dropped.

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod features;
pub mod output;
pub mod remote;
pub mod storage;

pub use cli::args::{Cli, Commands, OutputFormat};
pub use error::BoardsyncError;
pub use features::sync::{DrainOutcome, Mutation, SyncClient, SyncQueue};
pub use remote::{HttpEndpoint, RemoteEndpoint};
