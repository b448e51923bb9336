// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Status command handler

use std::fmt::Write;

use anyhow::Result;
use wf_daemon::StatusReport;

use crate::client::DaemonClient;
use crate::output::{self, format_time_ago, OutputFormat};

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let report = match client.status().await {
        Ok(report) => report,
        Err(e) if e.is_unreachable() && format == OutputFormat::Text => {
            println!("Daemon is not running ({})", client.addr());
            return Ok(());
        }
        Err(e) => return Err(super::exit_error(e)),
    };
    let now = output::now_ms();
    output::print(format, &report, || format_status(&report, now))
}

fn yes_no(ok: bool) -> &'static str {
    if ok {
        "ok"
    } else {
        "missing"
    }
}

pub(crate) fn format_status(report: &StatusReport, now_ms: u64) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "wfd {} (up {})", report.version, wf_core::format_elapsed(report.uptime_secs));
    match &report.active {
        Some(run) => {
            let _ = writeln!(
                out,
                "State: {} {} (run {}, started {} ago)",
                report.state,
                run.target,
                run.id,
                format_time_ago(run.started_at_ms, now_ms)
            );
        }
        None => {
            let _ = writeln!(out, "State: {}", report.state);
        }
    }
    let _ = writeln!(out, "Archived: {}", report.archived);
    let _ = writeln!(
        out,
        "Fuzzer: {} (checkout {}, entry {})",
        report.fuzzer.dir,
        yes_no(report.fuzzer.root),
        yes_no(report.fuzzer.exec)
    );
    for tool in &report.tools {
        match &tool.detail {
            Some(detail) => {
                let _ = writeln!(out, "  {}: {} ({})", tool.name, yes_no(tool.available), detail);
            }
            None => {
                let _ = writeln!(out, "  {}: {}", tool.name, yes_no(tool.available));
            }
        }
    }
    if let Some(failure) = &report.last_failure {
        let _ = writeln!(
            out,
            "Last failure: {} {} ago: {}",
            failure.target,
            format_time_ago(failure.at_ms, now_ms),
            failure.error
        );
    }
    out.trim_end().to_string()
}

#[cfg(test)]
#[path = "status_tests.rs"]
mod tests;
