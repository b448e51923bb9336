// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Watches one fuzz process until it ends.
//!
//! A watcher owns the process handle and reports completion exactly once on
//! the supervisor's completion channel. It is consumed by [`Watcher::spawn`],
//! so a second report is impossible.

use std::time::Duration;

use tokio::sync::mpsc;
use wf_adapters::FuzzProcess;
use wf_core::{ActiveRun, RunOutcome};

/// Completion notice for one run
#[derive(Debug, Clone)]
pub struct RunFinished {
    pub run: ActiveRun,
    pub outcome: RunOutcome,
}

pub(crate) struct Watcher {
    run: ActiveRun,
    process: Box<dyn FuzzProcess>,
    max_duration: Duration,
    done: mpsc::Sender<RunFinished>,
}

impl Watcher {
    pub(crate) fn new(
        run: ActiveRun,
        process: Box<dyn FuzzProcess>,
        max_duration: Duration,
        done: mpsc::Sender<RunFinished>,
    ) -> Self {
        Self { run, process, max_duration, done }
    }

    pub(crate) fn spawn(self) -> tokio::task::JoinHandle<()> {
        tokio::spawn(self.run())
    }

    async fn run(mut self) {
        let outcome = observe(self.process.as_mut(), self.max_duration).await;
        tracing::info!(
            run_id = %self.run.id,
            plugin = %self.run.target,
            outcome = %outcome,
            "fuzz process finished"
        );
        let finished = RunFinished { run: self.run, outcome };
        if self.done.send(finished).await.is_err() {
            tracing::warn!("completion channel closed, run will not be archived");
        }
    }
}

/// Wait for the process, killing it once `max_duration` has passed
pub(crate) async fn observe(process: &mut dyn FuzzProcess, max_duration: Duration) -> RunOutcome {
    match tokio::time::timeout(max_duration, process.wait()).await {
        Ok(Ok(exit)) => RunOutcome::Exited { code: exit.code },
        Ok(Err(e)) => RunOutcome::WaitFailed { error: e.to_string() },
        Err(_) => {
            tracing::warn!(
                pid = ?process.id(),
                max_secs = max_duration.as_secs(),
                "fuzz process exceeded maximum run time, killing"
            );
            if let Err(e) = process.kill().await {
                tracing::error!(error = %e, "failed to kill fuzz process");
            }
            // Reap so no zombie is left behind
            if let Err(e) = process.wait().await {
                tracing::warn!(error = %e, "failed to reap killed fuzz process");
            }
            RunOutcome::TimedOut
        }
    }
}

#[cfg(test)]
#[path = "watcher_tests.rs"]
mod tests;
