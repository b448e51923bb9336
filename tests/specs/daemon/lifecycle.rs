//! Daemon lifecycle specs
//!
//! Verify startup, the single-instance lock, and shutdown.

use crate::prelude::*;

#[test]
fn daemon_writes_pid_file_when_ready() {
    let temp = Project::new();
    let daemon = temp.start_daemon();

    let pid = std::fs::read_to_string(temp.state_dir().join("daemon.pid")).unwrap();
    assert_eq!(pid.trim(), daemon.pid().to_string());
    assert!(temp.archive_dir().is_dir());

    daemon.wf().args(&["state"]).passes().stdout_has("NOT_STARTED");
}

#[test]
fn second_daemon_fails_on_lock() {
    let temp = Project::new();
    let daemon = temp.start_daemon();

    let output = temp.daemon_command().output().unwrap();

    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Failed to acquire lock"), "stderr: {stderr}");
    // The running daemon keeps its PID file and keeps serving
    let pid = std::fs::read_to_string(temp.state_dir().join("daemon.pid")).unwrap();
    assert_eq!(pid.trim(), daemon.pid().to_string());
    daemon.wf().args(&["state"]).passes();
}

#[test]
fn sigterm_shuts_down_cleanly() {
    let temp = Project::new();
    let daemon = temp.start_daemon();

    let status = daemon.terminate();

    assert!(status.success(), "exit status: {status}");
    assert!(!temp.state_dir().join("daemon.pid").exists());
    let log = std::fs::read_to_string(temp.state_dir().join("daemon.log")).unwrap();
    assert!(log.contains("Daemon shutdown complete"), "log:\n{log}");
}

#[test]
fn history_is_rebuilt_from_archive_on_start() {
    let temp = Project::new();
    temp.file("state/archive/akismet.json", r#"{"command_results":[]}"#);
    let daemon = temp.start_daemon();

    daemon.wf().args(&["history"]).passes().stdout_has("akismet");
    daemon
        .wf()
        .args(&["fuzz", "akismet"])
        .fails()
        .code_is(1)
        .stderr_has("already been fuzzed");
}
