// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Environment and health report for `/status`.

use std::path::Path;

use wf_adapters::subprocess::{run_with_timeout, TOOL_CHECK_TIMEOUT};
use wf_adapters::{CatalogAdapter, CommandLine, FuzzerAdapter, PostProcessAdapter, TeardownAdapter};

use super::ListenCtx;
use crate::env::PROTOCOL_VERSION;
use crate::protocol::{FuzzerStatus, StatusReport, ToolStatus};

/// An external tool whose availability is reported. The command is really
/// executed, so it should be side-effect free (e.g. `docker version`).
#[derive(Debug, Clone)]
pub struct ToolCheck {
    pub name: String,
    pub command: CommandLine,
}

impl ToolCheck {
    pub fn new(name: impl Into<String>, command: CommandLine) -> Self {
        Self { name: name.into(), command }
    }

    /// `docker` and `docker-compose`, which the fuzz tool drives
    pub fn defaults() -> Vec<ToolCheck> {
        [("docker", "docker version"), ("docker-compose", "docker-compose version")]
            .into_iter()
            .filter_map(|(name, raw)| CommandLine::parse(raw).map(|cmd| ToolCheck::new(name, cmd)))
            .collect()
    }

    /// A tool counts as available if it could be started at all; its exit
    /// status is not considered (`docker version` fails without a daemon).
    async fn run(&self) -> ToolStatus {
        let cmd = self.command.command(Path::new("."), &[]);
        let detail = match run_with_timeout(cmd, TOOL_CHECK_TIMEOUT, &self.name).await {
            Ok(_) => None,
            Err(e) if e.is_not_found() => Some("not found".to_string()),
            Err(e) => Some(e.to_string()),
        };
        ToolStatus { name: self.name.clone(), available: detail.is_none(), detail }
    }
}

pub(super) async fn report<C, F, P, T>(ctx: &ListenCtx<C, F, P, T>) -> StatusReport
where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
{
    let mut tools = Vec::with_capacity(ctx.tool_checks.len());
    for check in &ctx.tool_checks {
        tools.push(check.run().await);
    }

    let supervisor = &ctx.supervisor;
    StatusReport {
        version: PROTOCOL_VERSION.to_string(),
        uptime_secs: ctx.start_time.elapsed().as_secs(),
        state: supervisor.state(),
        active_target: supervisor.active_target(),
        active: supervisor.active(),
        archived: supervisor.history().len(),
        fuzzer: FuzzerStatus {
            dir: ctx.fuzzer_dir.display().to_string(),
            root: ctx.fuzzer_dir.is_dir(),
            exec: ctx.fuzzer_dir.join(&ctx.fuzzer_entry).is_file(),
        },
        tools,
        last_failure: supervisor.last_failure(),
    }
}
