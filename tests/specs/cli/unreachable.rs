//! Behavior when no daemon is listening

use std::net::TcpListener;

use crate::prelude::*;

/// An address nothing listens on
fn dead_addr() -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    listener.local_addr().unwrap().to_string()
}

#[test]
fn state_without_daemon_exits_2() {
    let addr = dead_addr();
    cli()
        .args(&["--addr", &addr, "state"])
        .fails()
        .code_is(2)
        .stderr_has("daemon not reachable");
}

#[test]
fn status_without_daemon_reports_not_running() {
    let addr = dead_addr();
    cli().args(&["--addr", &addr, "status"]).passes().stdout_has("Daemon is not running");
}
