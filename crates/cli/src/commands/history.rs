// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wf history`: plugins whose results are archived

use anyhow::Result;
use wf_core::PluginSlug;

use crate::client::DaemonClient;
use crate::output::{self, OutputFormat};

pub async fn handle(client: &DaemonClient, format: OutputFormat) -> Result<()> {
    let history = client.history().await.map_err(super::exit_error)?;
    output::print(format, &history, || format_history(&history))
}

pub(crate) fn format_history(history: &[PluginSlug]) -> String {
    if history.is_empty() {
        return "No plugins archived".to_string();
    }
    history.iter().map(PluginSlug::as_str).collect::<Vec<_>>().join("\n")
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
