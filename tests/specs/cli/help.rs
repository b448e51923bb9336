//! CLI help output specs

use crate::prelude::*;

#[test]
fn wf_help_lists_commands() {
    cli()
        .args(&["--help"])
        .passes()
        .stdout_has("Usage:")
        .stdout_has("fuzz")
        .stdout_has("state")
        .stdout_has("history")
        .stdout_has("result")
        .stdout_has("status");
}

#[test]
fn wf_without_command_shows_usage_and_fails() {
    cli().fails().code_is(2).stderr_has("Usage:");
}

#[test]
fn wf_result_help_mentions_csv() {
    cli().args(&["result", "--help"]).passes().stdout_has("--csv");
}

#[test]
fn wf_version_shows_version() {
    cli().args(&["--version"]).passes().stdout_has("0.2");
}
