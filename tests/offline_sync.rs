//! End-to-end offline sync scenarios against an in-memory server.

use std::cell::{Cell, RefCell};
use std::collections::HashMap;
use std::time::Duration;

use boardsync::core::EntryId;
use boardsync::features::sync::{
    CreateTask, DeadLetterKind, EntryStatus, Mutation, Priority, StaticSignal, SyncClient,
    SyncQueue,
};
use boardsync::remote::{Ack, HttpEndpoint, RemoteEndpoint, RemoteFailure};
use boardsync::storage::Database;

/// Idempotent server keyed on entry id that can be switched offline or told
/// to reject specific titles.
#[derive(Default)]
struct FakeServer {
    offline: Cell<bool>,
    rejected_titles: RefCell<Vec<String>>,
    applied: RefCell<Vec<(EntryId, Mutation)>>,
    seen: RefCell<HashMap<EntryId, usize>>,
    /// Accept the write but fail to answer, like a timeout after commit.
    drop_next_ack: Cell<bool>,
}

impl FakeServer {
    fn applied_titles(&self) -> Vec<String> {
        self.applied
            .borrow()
            .iter()
            .map(|(_, m)| match m {
                Mutation::CreateTask(t) => t.title.clone(),
                other => other.display_name().to_string(),
            })
            .collect()
    }

    fn submissions(&self, id: &EntryId) -> usize {
        self.seen.borrow().get(id).copied().unwrap_or(0)
    }
}

impl RemoteEndpoint for FakeServer {
    fn submit(&self, id: &EntryId, payload: &Mutation) -> Result<Ack, RemoteFailure> {
        if self.offline.get() {
            return Err(RemoteFailure::Transient("connection refused".to_string()));
        }

        *self.seen.borrow_mut().entry(id.clone()).or_default() += 1;

        if let Mutation::CreateTask(task) = payload {
            if self.rejected_titles.borrow().contains(&task.title) {
                return Err(RemoteFailure::Permanent {
                    status: Some(422),
                    reason: "title rejected".to_string(),
                });
            }
        }

        let already_applied = self.applied.borrow().iter().any(|(seen, _)| seen == id);
        if !already_applied {
            self.applied.borrow_mut().push((id.clone(), payload.clone()));
        }

        if self.drop_next_ack.replace(false) {
            return Err(RemoteFailure::Transient("request timed out".to_string()));
        }
        Ok(Ack { status: 200 })
    }
}

fn task(title: &str) -> Mutation {
    Mutation::CreateTask(CreateTask {
        title: title.to_string(),
        description: None,
        project_id: 1,
        column_id: None,
        due_date: None,
        priority: Priority::Medium,
        assignee_id: None,
    })
}

fn queue() -> SyncQueue {
    SyncQueue::with_database(Database::open_in_memory().unwrap())
}

#[test]
fn queued_offline_then_delivered_when_online() {
    let server = FakeServer::default();
    let mut client = SyncClient::new(queue(), &server, &StaticSignal(false)).unwrap();

    let id = client
        .queue()
        .enqueue_with_id(EntryId::parse("x1").unwrap(), &task("Buy milk"))
        .unwrap();
    assert_eq!(client.pending_count().unwrap(), 1);

    let outcome = client.on_connectivity(true).unwrap().unwrap();

    assert_eq!(outcome.report().unwrap().delivered, vec![id.clone()]);
    assert_eq!(server.submissions(&id), 1);
    assert_eq!(client.pending_count().unwrap(), 0);
}

#[test]
fn permanent_rejection_is_dead_lettered_and_not_retried() {
    let server = FakeServer::default();
    server.rejected_titles.borrow_mut().push("bad".to_string());
    let client = SyncClient::new(queue(), &server, &StaticSignal(true)).unwrap();

    let id = client
        .queue()
        .enqueue_with_id(EntryId::parse("x2").unwrap(), &task("bad"))
        .unwrap();

    client.force_sync().unwrap();
    client.force_sync().unwrap();

    assert_eq!(client.pending_count().unwrap(), 0);
    assert_eq!(server.submissions(&id), 1);

    let letters = client.dead_letters().unwrap();
    assert_eq!(letters.len(), 1);
    assert_eq!(letters[0].id, id);
    assert_eq!(letters[0].status_code, Some(422));
    assert_eq!(letters[0].kind, DeadLetterKind::Rejected);
}

#[test]
fn submissions_while_offline_arrive_once_in_order() {
    let server = FakeServer::default();
    let mut client = SyncClient::new(queue(), &server, &StaticSignal(false)).unwrap();

    for title in ["one", "two", "three", "four"] {
        client.submit(&task(title)).unwrap();
    }

    // Flapping while still unreachable.
    server.offline.set(true);
    client.on_connectivity(true).unwrap();
    client.on_connectivity(false).unwrap();
    assert!(server.applied.borrow().is_empty());

    server.offline.set(false);
    let outcome = client.on_connectivity(true).unwrap().unwrap();

    assert!(outcome.report().unwrap().is_clean());
    assert_eq!(server.applied_titles(), vec!["one", "two", "three", "four"]);
}

#[test]
fn transient_failure_blocks_later_entries() {
    let server = FakeServer::default();
    let client = SyncClient::new(queue(), &server, &StaticSignal(true)).unwrap();

    let a = client.submit(&task("A")).unwrap();
    let b = client.submit(&task("B")).unwrap();

    server.offline.set(true);
    let outcome = client.force_sync().unwrap();
    let report = outcome.report().unwrap();

    assert_eq!(report.failed, Some(a.clone()));
    assert_eq!(server.submissions(&b), 0);
    assert_eq!(
        client.queue().get(&b).unwrap().unwrap().status,
        EntryStatus::Pending
    );

    server.offline.set(false);
    client.force_sync().unwrap();
    assert_eq!(server.applied_titles(), vec!["A", "B"]);
    assert_eq!(client.pending_count().unwrap(), 0);
}

#[test]
fn lost_ack_is_resubmitted_without_duplicating() {
    let server = FakeServer::default();
    let client = SyncClient::new(queue(), &server, &StaticSignal(true)).unwrap();
    let id = client.submit(&task("Pay rent")).unwrap();

    server.drop_next_ack.set(true);
    client.force_sync().unwrap();
    assert_eq!(client.pending_count().unwrap(), 1);

    client.force_sync().unwrap();

    assert_eq!(server.submissions(&id), 2);
    assert_eq!(server.applied_titles(), vec!["Pay rent"]);
    assert_eq!(client.pending_count().unwrap(), 0);
}

#[test]
fn crash_after_mark_in_flight_is_recovered() {
    let temp_dir = tempfile::TempDir::new().unwrap();
    let db_path = temp_dir.path().join("boardsync.db");

    let id = {
        let queue = SyncQueue::with_database(Database::open_at(&db_path).unwrap());
        let id = queue.enqueue(&task("Survive restart")).unwrap();
        // Process dies mid-submission.
        queue.mark_in_flight(&id).unwrap();
        id
    };

    let server = FakeServer::default();
    let queue = SyncQueue::with_database(Database::open_at(&db_path).unwrap());
    let client = SyncClient::new(queue, &server, &StaticSignal(true)).unwrap();

    assert_eq!(
        client.queue().get(&id).unwrap().unwrap().status,
        EntryStatus::Pending
    );

    client.force_sync().unwrap();
    assert_eq!(server.submissions(&id), 1);
    assert_eq!(client.pending_count().unwrap(), 0);
}

#[test]
fn requeued_dead_letter_is_delivered_under_new_id() {
    let server = FakeServer::default();
    server.rejected_titles.borrow_mut().push("".to_string());
    let client = SyncClient::new(queue(), &server, &StaticSignal(true)).unwrap();

    let id = client.submit(&task("")).unwrap();
    client.force_sync().unwrap();
    assert_eq!(client.dead_letters().unwrap().len(), 1);

    let new_id = client
        .queue()
        .requeue_dead_letter(&id, Some(task("Named now")))
        .unwrap();
    client.force_sync().unwrap();

    assert_ne!(new_id, id);
    assert!(client.dead_letters().unwrap().is_empty());
    assert_eq!(server.applied_titles(), vec!["Named now"]);
}

#[test]
fn http_endpoint_against_unreachable_server_keeps_entry() {
    let endpoint =
        HttpEndpoint::new("http://127.0.0.1:9/api/sync", Duration::from_secs(2)).unwrap();
    let client = SyncClient::new(queue(), endpoint, &StaticSignal(true)).unwrap();
    let id = client.submit(&task("Later")).unwrap();

    let outcome = client.force_sync().unwrap();

    assert_eq!(outcome.report().unwrap().failed, Some(id.clone()));
    let entry = client.queue().get(&id).unwrap().unwrap();
    assert_eq!(entry.status, EntryStatus::Failed);
    assert_eq!(entry.attempts, 1);
}
