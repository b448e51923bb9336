//! Fuzz run specs
//!
//! Drive a full run through the API: start, conflict, completion, archive.

use crate::prelude::*;

fn wait_until_idle(daemon: &Daemon) -> bool {
    wait_for(SPEC_WAIT_MAX_MS, || {
        daemon.wf().args(&["state"]).passes().stdout().trim() == "NOT_STARTED"
    })
}

#[test]
fn run_is_started_archived_and_queryable() {
    let temp = Project::new();
    let daemon = temp.start_daemon();

    daemon
        .wf()
        .args(&["fuzz", "akismet"])
        .passes()
        .stdout_has("Fuzzer started with plugin akismet");
    daemon.wf().args(&["state"]).passes().stdout_has("FUZZING");

    // Only one run at a time
    daemon
        .wf()
        .args(&["fuzz", "jetpack"])
        .fails()
        .code_is(1)
        .stderr_has("already in progress for 'akismet'");

    temp.release("akismet");
    assert!(wait_until_idle(&daemon), "run should be archived");

    daemon.wf().args(&["history"]).passes().stdout_has("akismet");
    assert!(temp.archive_dir().join("akismet.json").is_file());
    assert!(!temp.results_dir().join("akismet_run.json").exists());

    daemon.wf().args(&["result", "akismet"]).passes().stdout_has("\"command_results\"");
    daemon
        .wf()
        .args(&["result", "akismet", "--csv"])
        .passes()
        .stdout_has("cmd,object_name,return_code,stdout,stderr")
        .stdout_has("wp plugin activate akismet,akismet,0,\"ok, done\",");
}

#[test]
fn archived_plugin_cannot_be_fuzzed_again() {
    let temp = Project::new();
    let daemon = temp.start_daemon();

    daemon.wf().args(&["fuzz", "wordfence"]).passes();
    temp.release("wordfence");
    assert!(wait_until_idle(&daemon));

    daemon
        .wf()
        .args(&["fuzz", "wordfence"])
        .fails()
        .stderr_has("already been fuzzed");
}

#[test]
fn unknown_plugin_is_rejected() {
    let temp = Project::new();
    let daemon = temp.start_daemon();

    daemon
        .wf()
        .args(&["fuzz", "nonexistent"])
        .fails()
        .code_is(1)
        .stderr_has("not found");
    daemon.wf().args(&["state"]).passes().stdout_has("NOT_STARTED");
}

#[test]
fn invalid_slug_is_rejected() {
    let temp = Project::new();
    let daemon = temp.start_daemon();

    daemon.wf().args(&["fuzz", "Bad_Slug"]).fails().stderr_has("invalid plugin slug");
}

#[test]
fn results_for_unarchived_plugin_are_not_found() {
    let temp = Project::new();
    let daemon = temp.start_daemon();

    daemon.wf().args(&["result", "jetpack"]).fails().code_is(1).stderr_has("not found");
}

#[test]
fn status_reports_active_run_as_json() {
    let temp = Project::new();
    let daemon = temp.start_daemon();
    daemon.wf().args(&["fuzz", "jetpack"]).passes();

    let report = daemon.wf().args(&["-o", "json", "status"]).passes().json();

    assert_eq!(report["state"], "FUZZING");
    assert_eq!(report["active_target"], "jetpack");
    assert_eq!(report["fuzzer"]["root"], true);
    assert_eq!(report["fuzzer"]["exec"], true);

    temp.release("jetpack");
    assert!(wait_until_idle(&daemon));
}
