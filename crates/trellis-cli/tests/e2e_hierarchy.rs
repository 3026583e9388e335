//! End-to-end tests for the `tl` binary: project setup, linking, cycle
//! rejection, and cascading completion through the command line.

use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::Value;
use std::path::Path;
use tempfile::TempDir;

/// A `tl` invocation isolated from the host's env and user config.
fn tl_raw(dir: &Path) -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tl"));
    cmd.current_dir(dir)
        .env("XDG_CONFIG_HOME", dir.join("xdg"))
        .env("TRELLIS_LOG", "error")
        .env_remove("TRELLIS_ACTOR")
        .env_remove("FORMAT");
    cmd
}

/// A JSON-mode `tl` invocation acting as `actor`.
fn tl_as(dir: &Path, actor: i64) -> Command {
    let mut cmd = tl_raw(dir);
    cmd.arg("--json").env("TRELLIS_ACTOR", actor.to_string());
    cmd
}

fn json_stdout(cmd: &mut Command) -> Value {
    let output = cmd.output().expect("run tl");
    assert!(
        output.status.success(),
        "tl failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    serde_json::from_slice(&output.stdout).expect("stdout is JSON")
}

fn init_project(dir: &Path) {
    tl_raw(dir).arg("init").assert().success();
}

fn add_user(dir: &Path, name: &str, role: &str) -> i64 {
    let user = json_stdout(tl_raw(dir).args(["--json", "user", "add", name, "--role", role]));
    user["id"].as_i64().expect("user id")
}

fn create_task(dir: &Path, actor: i64, title: &str) -> i64 {
    let task = json_stdout(tl_as(dir, actor).args(["create", "--title", title]));
    task["id"].as_i64().expect("task id")
}

fn create_subtask(dir: &Path, actor: i64, parent: i64, title: &str) -> Value {
    json_stdout(tl_as(dir, actor).args(["subtask", &parent.to_string(), "--title", title]))
}

fn link(dir: &Path, actor: i64, parent: i64, child: i64) -> Value {
    json_stdout(tl_as(dir, actor).args(["link", &parent.to_string(), &child.to_string()]))
}

fn show(dir: &Path, task: i64) -> Value {
    json_stdout(tl_raw(dir).args(["--json", "show", &task.to_string()]))
}

/// Project with one admin user.
fn setup() -> (TempDir, i64) {
    let dir = TempDir::new().expect("temp dir");
    init_project(dir.path());
    let admin = add_user(dir.path(), "alice", "admin");
    (dir, admin)
}

#[test]
fn init_creates_config_and_store() {
    let dir = TempDir::new().expect("temp dir");
    tl_raw(dir.path())
        .arg("init")
        .assert()
        .success()
        .stdout(predicate::str::contains("Initialized .trellis/"));

    assert!(dir.path().join(".trellis/config.toml").exists());
    assert!(dir.path().join(".trellis/trellis.sqlite3").exists());

    tl_raw(dir.path())
        .arg("init")
        .assert()
        .failure()
        .stderr(predicate::str::contains("--force"));
}

#[test]
fn commands_require_an_initialized_project() {
    let dir = TempDir::new().expect("temp dir");
    tl_raw(dir.path())
        .args(["--json", "stats"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E1001"));
}

#[test]
fn mutations_require_an_actor() {
    let (dir, _) = setup();
    tl_raw(dir.path())
        .args(["--json", "create", "--title", "Orphan"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("missing_actor"));
}

#[test]
fn as_flag_overrides_env_actor() {
    let (dir, admin) = setup();
    let task = json_stdout(
        tl_as(dir.path(), 999).args(["--as", &admin.to_string(), "create", "--title", "Mine"]),
    );
    assert_eq!(task["creator_id"], admin);
}

#[test]
fn link_is_visible_from_both_ends() {
    let (dir, admin) = setup();
    let parent = create_task(dir.path(), admin, "Parent");
    let child = create_task(dir.path(), admin, "Child");

    let edge = link(dir.path(), admin, parent, child);
    assert_eq!(edge["parent_id"], parent);
    assert_eq!(edge["child_id"], child);

    let parent_view = show(dir.path(), parent);
    assert_eq!(parent_view["children"][0]["id"], child);
    let child_view = show(dir.path(), child);
    assert_eq!(child_view["parents"][0]["id"], parent);
}

#[test]
fn relinking_returns_the_same_edge() {
    let (dir, admin) = setup();
    let a = create_task(dir.path(), admin, "A");
    let b = create_task(dir.path(), admin, "B");

    let first = link(dir.path(), admin, a, b);
    let second = link(dir.path(), admin, a, b);
    assert_eq!(first["edge_id"], second["edge_id"]);
}

#[test]
fn closing_a_cycle_is_rejected_with_its_path() {
    let (dir, admin) = setup();
    let a = create_task(dir.path(), admin, "A");
    let b = create_task(dir.path(), admin, "B");
    let c = create_task(dir.path(), admin, "C");
    link(dir.path(), admin, a, b);
    link(dir.path(), admin, b, c);

    let output = tl_as(dir.path(), admin)
        .args(["link", &c.to_string(), &a.to_string()])
        .output()
        .expect("run tl");
    assert!(!output.status.success());

    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("\"error_code\": \"E2003\""), "stderr: {stderr}");
    assert!(stderr.contains(&format!("{c} → {a} → {b} → {c}")), "stderr: {stderr}");

    let report = json_stdout(tl_raw(dir.path()).args(["--json", "verify"]));
    assert_eq!(report["edge_count"], 2);
    assert_eq!(report["cycles"].as_array().map(Vec::len), Some(0));
}

#[test]
fn self_link_is_rejected() {
    let (dir, admin) = setup();
    let a = create_task(dir.path(), admin, "A");

    tl_as(dir.path(), admin)
        .args(["link", &a.to_string(), &a.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2006"));
}

#[test]
fn plain_users_cannot_link_tasks_they_did_not_create() {
    let (dir, admin) = setup();
    let bob = add_user(dir.path(), "bob", "user");
    let a = create_task(dir.path(), admin, "A");
    let b = create_task(dir.path(), admin, "B");

    tl_as(dir.path(), bob)
        .args(["link", &a.to_string(), &b.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E4001"));
}

#[test]
fn subtask_copies_parent_assignees() {
    let (dir, admin) = setup();
    let bob = add_user(dir.path(), "bob", "user");
    let parent = json_stdout(tl_as(dir.path(), admin).args([
        "create",
        "--title",
        "Parent",
        "--assign",
        &bob.to_string(),
    ]));
    let parent_id = parent["id"].as_i64().expect("id");

    let subtask = create_subtask(dir.path(), admin, parent_id, "Child");
    assert_eq!(subtask["assignees"], serde_json::json!([bob]));
    assert_eq!(subtask["edge"]["parent_id"], parent_id);
    assert_eq!(subtask["status"], "open");
}

#[test]
fn completing_every_child_completes_the_parent() {
    let (dir, admin) = setup();
    let parent = create_task(dir.path(), admin, "Release");
    let first = create_subtask(dir.path(), admin, parent, "Docs")["id"]
        .as_i64()
        .expect("id");
    let second = create_subtask(dir.path(), admin, parent, "Tests")["id"]
        .as_i64()
        .expect("id");

    let update = json_stdout(tl_as(dir.path(), admin).args(["status", &first.to_string(), "done"]));
    assert_eq!(update["propagation"]["completed"], serde_json::json!([]));
    assert_eq!(show(dir.path(), parent)["status"], "open");

    let update =
        json_stdout(tl_as(dir.path(), admin).args(["status", &second.to_string(), "completed"]));
    assert_eq!(update["task"]["status"], "completed");
    assert_eq!(update["propagation"]["completed"], serde_json::json!([parent]));
    assert_eq!(show(dir.path(), parent)["status"], "completed");
}

#[test]
fn unlink_reports_whether_an_edge_was_removed() {
    let (dir, admin) = setup();
    let a = create_task(dir.path(), admin, "A");
    let b = create_task(dir.path(), admin, "B");
    link(dir.path(), admin, a, b);

    let unlink = |dir: &Path| {
        json_stdout(tl_as(dir, admin).args(["unlink", &a.to_string(), &b.to_string()]))
    };
    assert_eq!(unlink(dir.path())["removed"], true);
    assert_eq!(unlink(dir.path())["removed"], false);
    assert_eq!(show(dir.path(), b)["parents"], serde_json::json!([]));
}

#[test]
fn delete_removes_task_and_its_links() {
    let (dir, admin) = setup();
    let parent = create_task(dir.path(), admin, "Parent");
    let child = create_subtask(dir.path(), admin, parent, "Child")["id"]
        .as_i64()
        .expect("id");

    tl_as(dir.path(), admin)
        .args(["delete", &parent.to_string()])
        .assert()
        .success();

    assert_eq!(show(dir.path(), child)["parents"], serde_json::json!([]));
    tl_raw(dir.path())
        .args(["--json", "show", &parent.to_string()])
        .assert()
        .failure()
        .stderr(predicate::str::contains("E2001"));
}

#[test]
fn stats_count_tasks_by_status() {
    let (dir, admin) = setup();
    let a = create_task(dir.path(), admin, "A");
    create_task(dir.path(), admin, "B");
    let c = create_task(dir.path(), admin, "C");

    tl_as(dir.path(), admin)
        .args(["status", &a.to_string(), "in_progress"])
        .assert()
        .success();
    tl_as(dir.path(), admin)
        .args(["status", &c.to_string(), "done"])
        .assert()
        .success();

    let stats = json_stdout(tl_raw(dir.path()).args(["--json", "stats"]));
    assert_eq!(stats["total"], 3);
    assert_eq!(stats["open"], 1);
    assert_eq!(stats["in_progress"], 1);
    assert_eq!(stats["completed"], 1);
}

#[test]
fn text_output_is_the_default() {
    let (dir, admin) = setup();
    let a = create_task(dir.path(), admin, "Write the changelog");

    tl_raw(dir.path())
        .args(["show", &a.to_string()])
        .assert()
        .success()
        .stdout(
            predicate::str::contains("Write the changelog")
                .and(predicate::str::contains("Status:")),
        );
}

#[test]
fn format_env_selects_json() {
    let (dir, _) = setup();
    let output = tl_raw(dir.path())
        .env("FORMAT", "json")
        .arg("stats")
        .output()
        .expect("run tl");
    assert!(output.status.success());
    let stats: Value = serde_json::from_slice(&output.stdout).expect("stdout is JSON");
    assert_eq!(stats["total"], 0);
}
