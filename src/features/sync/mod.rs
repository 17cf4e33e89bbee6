//! Offline write queue and reconciliation.
//!
//! Mutations are written to a durable local queue first and delivered to the
//! remote endpoint later, in order, by the reconciler.
//!
//! Features:
//! - Durable queue with crash recovery of in-flight entries
//! - Ordered delivery that halts on transient failure
//! - Dead letters for rejected or exhausted entries, with requeue
//! - Connectivity and timer triggers guarded by a single drain lock

pub mod client;
pub mod connectivity;
pub mod entry;
pub mod lock;
pub mod mutation;
pub mod queue;
pub mod reconciler;

pub use client::SyncClient;
pub use connectivity::{ConnectivityMonitor, ConnectivitySignal, StaticSignal, Transition};
pub use entry::{DeadLetter, DeadLetterKind, EntryStatus, FailOutcome, QueueEntry};
pub use lock::{DrainGuard, DrainLock};
pub use mutation::{CreateProject, CreateTask, MoveTask, Mutation, Priority, UpdateProject};
pub use queue::{QueueStats, SyncQueue};
pub use reconciler::{format_drain_outcome, DrainOutcome, DrainReport, Reconciler};
