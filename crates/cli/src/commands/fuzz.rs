// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wf fuzz <slug>`

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(client: &DaemonClient, target: &str, format: OutputFormat) -> Result<()> {
    let started = client.start(target).await.map_err(super::exit_error)?;
    output::print(format, &started, || format!("{} (run {})", started.message, started.run_id))
}
