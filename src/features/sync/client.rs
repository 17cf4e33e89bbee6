//! Facade used by the application: submit mutations, read the backlog, and
//! feed connectivity and timer triggers.

use super::connectivity::{ConnectivityMonitor, ConnectivitySignal, Transition};
use super::entry::DeadLetter;
use super::mutation::Mutation;
use super::queue::SyncQueue;
use super::reconciler::{DrainOutcome, Reconciler};
use crate::core::EntryId;
use crate::error::BoardsyncError;
use crate::remote::RemoteEndpoint;

/// Offline-first sync client.
pub struct SyncClient<R> {
    queue: SyncQueue,
    reconciler: Reconciler<R>,
    monitor: ConnectivityMonitor,
}

impl<R: RemoteEndpoint> SyncClient<R> {
    /// Create a client, reading the initial connectivity state from `signal`.
    ///
    /// Entries left in flight by a previous run are reverted to pending.
    ///
    /// # Errors
    ///
    /// Returns an error if stale entries cannot be recovered.
    pub fn new(
        queue: SyncQueue,
        remote: R,
        signal: &dyn ConnectivitySignal,
    ) -> Result<Self, BoardsyncError> {
        queue.recover_stale_in_flight()?;

        Ok(Self {
            queue,
            reconciler: Reconciler::new(remote),
            monitor: ConnectivityMonitor::from_signal(signal),
        })
    }

    /// Queue a mutation for delivery and return its id immediately.
    ///
    /// # Errors
    ///
    /// Returns an error if the mutation could not be stored. Nothing was
    /// queued in that case.
    pub fn submit(&self, mutation: &Mutation) -> Result<EntryId, BoardsyncError> {
        self.queue.enqueue(mutation)
    }

    /// Entries not yet acknowledged by the server.
    ///
    /// # Errors
    ///
    /// Returns an error if the queue cannot be read.
    pub fn pending_count(&self) -> Result<usize, BoardsyncError> {
        self.queue.pending_count()
    }

    /// Drain now, regardless of the last connectivity reading.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails during the drain.
    pub fn force_sync(&self) -> Result<DrainOutcome, BoardsyncError> {
        self.reconciler.drain(&self.queue)
    }

    /// Feed a connectivity reading. Drains when the client comes back online.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails during the drain.
    pub fn on_connectivity(&mut self, online: bool) -> Result<Option<DrainOutcome>, BoardsyncError> {
        match self.monitor.observe(online) {
            Some(Transition::CameOnline) => self.reconciler.drain(&self.queue).map(Some),
            Some(Transition::WentOffline) | None => Ok(None),
        }
    }

    /// Background timer trigger. Drains only while online.
    ///
    /// # Errors
    ///
    /// Returns an error if local storage fails during the drain.
    pub fn tick(&self) -> Result<Option<DrainOutcome>, BoardsyncError> {
        if !self.monitor.is_online() {
            return Ok(None);
        }
        self.reconciler.drain(&self.queue).map(Some)
    }

    #[must_use]
    pub const fn is_online(&self) -> bool {
        self.monitor.is_online()
    }

    /// Entries that will not be retried automatically.
    ///
    /// # Errors
    ///
    /// Returns an error if the dead-letter table cannot be read.
    pub fn dead_letters(&self) -> Result<Vec<DeadLetter>, BoardsyncError> {
        self.queue.list_dead_letters()
    }

    #[must_use]
    pub const fn queue(&self) -> &SyncQueue {
        &self.queue
    }
}
