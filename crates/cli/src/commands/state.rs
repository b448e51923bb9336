// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use anyhow::Result;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let state = client.state().await.map_err(super::exit_error)?;
    output::print(format, &state, || state.to_string())
}
