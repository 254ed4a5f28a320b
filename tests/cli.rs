//! End-to-end smoke tests for the `tt` binary against a temp database.

use assert_cmd::Command;
use std::path::Path;

fn tt(db: &Path) -> Command {
    let mut cmd = Command::cargo_bin("tt").unwrap();
    cmd.arg("--db").arg(db);
    cmd
}

fn stdout_of(cmd: &mut Command) -> String {
    let output = cmd.output().unwrap();
    assert!(
        output.status.success(),
        "command failed: {}",
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[test]
fn test_version_runs() {
    let out = stdout_of(Command::cargo_bin("tt").unwrap().arg("version"));
    assert!(out.contains(env!("CARGO_PKG_VERSION")));
}

#[test]
fn test_init_create_list_flow() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tracker.db");

    tt(&db).arg("init").assert().success();

    let out = stdout_of(tt(&db).args(["project", "create", "Demo Project", "-p", "high"]));
    assert!(out.contains("demo-project"));

    tt(&db)
        .args(["quick", "demo-project", "First task"])
        .assert()
        .success();

    // stdout is non-TTY here, so output is JSON
    let out = stdout_of(tt(&db).args(["project", "list"]));
    assert!(out.contains("demo-project"));
    assert!(out.contains("\"count\":1"));

    let out = stdout_of(tt(&db).args(["log", "list"]));
    assert!(out.contains("First task"));
}

#[test]
fn test_unknown_project_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("tracker.db");

    tt(&db).arg("init").assert().success();

    tt(&db)
        .args(["quick", "ghost", "title"])
        .assert()
        .failure()
        .code(3);
}

#[test]
fn test_uninitialized_exit_code() {
    let dir = tempfile::tempdir().unwrap();
    let db = dir.path().join("missing.db");

    tt(&db)
        .args(["project", "list"])
        .assert()
        .failure()
        .code(2);
}
