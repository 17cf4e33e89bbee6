//! Command-line behaviour against a throwaway data directory.

use std::path::Path;

use assert_cmd::Command;
use predicates::prelude::*;
use tempfile::TempDir;

fn boardsync(home: &Path) -> Command {
    let mut cmd = Command::cargo_bin("boardsync").unwrap();
    cmd.env("BOARDSYNC_HOME", home).env_remove("RUST_LOG");
    cmd
}

/// Point the remote at a closed local port so nothing leaves the machine.
fn offline_home() -> TempDir {
    let home = TempDir::new().unwrap();
    std::fs::write(
        home.path().join("config.yaml"),
        "remote:\n  base_url: http://127.0.0.1:9\n  request_timeout_secs: 2\n  probe_timeout_secs: 1\n",
    )
    .unwrap();
    home
}

fn json_output(cmd: &mut Command) -> serde_json::Value {
    let output = cmd.output().unwrap();
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));
    serde_json::from_slice(&output.stdout).unwrap()
}

#[test]
fn task_add_queues_and_status_counts_it() {
    let home = offline_home();

    boardsync(home.path())
        .args(["task", "add", "Buy milk", "--project", "7"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Queued Create Task"));

    let status = json_output(boardsync(home.path()).args(["sync", "status", "-o", "json"]));
    assert_eq!(status["pending"], 1);
    assert_eq!(status["dead_letters"], 0);

    let list = json_output(boardsync(home.path()).args(["sync", "list", "-o", "json"]));
    assert_eq!(list["count"], 1);
    assert_eq!(list["items"][0]["payload"]["title"], "Buy milk");
}

#[test]
fn sync_run_while_unreachable_keeps_entries() {
    let home = offline_home();

    boardsync(home.path())
        .args(["project", "delete", "4"])
        .assert()
        .success();

    let outcome = json_output(boardsync(home.path()).args(["sync", "run", "-o", "json"]));
    assert_eq!(outcome["outcome"], "completed");
    assert_eq!(outcome["halted"], true);
    assert_eq!(outcome["remaining"], 1);
}

#[test]
fn watch_once_reports_unreachable() {
    let home = offline_home();

    boardsync(home.path())
        .args(["sync", "watch", "--once"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Server unreachable"));
}

#[test]
fn board_move_updates_board_and_queues_move() {
    let home = offline_home();
    let run = |args: &[&str]| {
        boardsync(home.path()).args(args).assert().success();
    };

    run(&["board", "column", "add", "7", "todo", "To Do"]);
    run(&["board", "column", "add", "7", "done", "Done"]);
    run(&["board", "item", "add", "7", "todo", "t1"]);
    run(&["board", "move", "7", "t1", "--from", "todo", "--to", "done", "--index", "0"]);

    let board = json_output(boardsync(home.path()).args(["board", "show", "7", "-o", "json"]));
    assert_eq!(board["columns"][0]["items"], serde_json::json!([]));
    assert_eq!(board["columns"][1]["items"], serde_json::json!(["t1"]));

    let list = json_output(boardsync(home.path()).args(["sync", "list", "-o", "json"]));
    assert_eq!(list["items"][0]["payload"]["kind"], "move_task");
    assert_eq!(list["items"][0]["payload"]["to_column"], "done");
}

#[test]
fn invalid_move_changes_nothing() {
    let home = offline_home();
    boardsync(home.path())
        .args(["board", "column", "add", "7", "todo", "To Do"])
        .assert()
        .success();

    boardsync(home.path())
        .args(["board", "move", "7", "ghost", "--from", "todo", "--to", "todo"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Not found"));

    let status = json_output(boardsync(home.path()).args(["sync", "status", "-o", "json"]));
    assert_eq!(status["pending"], 0);
}

#[test]
fn clear_requires_force() {
    let home = offline_home();

    boardsync(home.path())
        .args(["sync", "clear"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));

    boardsync(home.path())
        .args(["sync", "clear", "--force"])
        .assert()
        .success();
}

#[test]
fn bad_input_is_reported() {
    let home = offline_home();

    boardsync(home.path())
        .args(["task", "add", "t", "--project", "1", "--priority", "urgent"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown priority"));
}

#[test]
fn config_init_and_path() {
    let home = TempDir::new().unwrap();

    boardsync(home.path())
        .args(["config", "path"])
        .assert()
        .success()
        .stdout(predicate::str::contains("config.yaml"));

    boardsync(home.path())
        .args(["config", "init"])
        .assert()
        .success();
    assert!(home.path().join("config.yaml").exists());

    boardsync(home.path())
        .args(["config", "init"])
        .assert()
        .failure();
}

#[test]
fn completions_generate() {
    let home = TempDir::new().unwrap();

    boardsync(home.path())
        .args(["completions", "bash"])
        .assert()
        .success()
        .stdout(predicate::str::contains("boardsync"));
}
