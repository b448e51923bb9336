// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fuzz run state and records

use serde::{Deserialize, Serialize};

use crate::{PluginSlug, RunId};

/// Externally visible state of the supervisor.
///
/// `NotStarted` iff no run is active (or being started).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RunState {
    NotStarted,
    Fuzzing,
}

crate::simple_display! {
    RunState {
        NotStarted => "NOT_STARTED",
        Fuzzing => "FUZZING",
    }
}

/// The one fuzz run currently in flight
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActiveRun {
    pub id: RunId,
    pub target: PluginSlug,
    /// OS process id of the fuzz tool, when the platform reports one
    pub pid: Option<u32>,
    pub started_at_ms: u64,
}

/// How the fuzz process ended
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RunOutcome {
    /// Process exited on its own. `code` is `None` when killed by a signal.
    Exited { code: Option<i32> },
    /// Exceeded the maximum run duration and was killed
    TimedOut,
    /// Waiting on the process failed; it is treated as finished
    WaitFailed { error: String },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Exited { code: Some(0) })
    }
}

impl std::fmt::Display for RunOutcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunOutcome::Exited { code: Some(code) } => write!(f, "exited({})", code),
            RunOutcome::Exited { code: None } => f.write_str("exited(signal)"),
            RunOutcome::TimedOut => f.write_str("timed out"),
            RunOutcome::WaitFailed { error } => write!(f, "wait failed: {}", error),
        }
    }
}

/// Why the most recent run could not be archived
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunFailure {
    pub run_id: RunId,
    pub target: PluginSlug,
    pub outcome: RunOutcome,
    pub error: String,
    pub at_ms: u64,
}

#[cfg(test)]
#[path = "run_tests.rs"]
mod tests;
