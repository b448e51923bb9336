// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! JSON bodies exchanged over the HTTP API

use serde::{Deserialize, Serialize};
use wf_core::{ActiveRun, PluginSlug, RunFailure, RunState};

/// Body of a 202 reply to a start request
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StartedBody {
    pub message: String,
    pub run_id: String,
    pub target: PluginSlug,
}

/// Body of every error reply
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable kind, e.g. `conflict`
    pub error: String,
    pub message: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self { error: error.into(), message: message.into() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryBody {
    pub data: Vec<PluginSlug>,
}

/// Whether the fuzz tool checkout looks usable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FuzzerStatus {
    pub dir: String,
    /// Checkout directory exists
    pub root: bool,
    /// Entry script exists in the checkout
    pub exec: bool,
}

/// Whether an external tool can be run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolStatus {
    pub name: String,
    pub available: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
}

/// Environment and health report served on `/status`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusReport {
    pub version: String,
    pub uptime_secs: u64,
    pub state: RunState,
    #[serde(default)]
    pub active_target: Option<PluginSlug>,
    #[serde(default)]
    pub active: Option<ActiveRun>,
    pub archived: usize,
    pub fuzzer: FuzzerStatus,
    pub tools: Vec<ToolStatus>,
    #[serde(default)]
    pub last_failure: Option<RunFailure>,
}
