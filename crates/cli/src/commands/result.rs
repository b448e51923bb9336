// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wf result <slug>`: print an archived artifact, or export its findings
//! as CSV.

use std::io::Write;

use anyhow::Result;
use wf_core::Findings;

use crate::client::DaemonClient;

pub async fn handle(client: &DaemonClient, target: &str, csv: bool) -> Result<()> {
    let artifact = client.result(target).await.map_err(super::exit_error)?;
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    write_result(&mut out, &artifact, csv)?;
    out.flush()?;
    Ok(())
}

/// The artifact is always printed as JSON; `--output` does not apply
pub(crate) fn write_result<W: Write>(out: &mut W, artifact: &serde_json::Value, csv: bool) -> Result<()> {
    if csv {
        Findings::from_value(artifact).write_csv(out)?;
    } else {
        serde_json::to_writer_pretty(&mut *out, artifact)?;
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
#[path = "result_tests.rs"]
mod tests;
