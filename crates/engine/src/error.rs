// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use thiserror::Error;
use wf_adapters::{CommandError, FuzzerError};
use wf_core::{PluginSlug, SlugError};

/// Errors returned to callers of the supervisor
#[derive(Debug, Error)]
pub enum SupervisorError {
    #[error("a fuzz run is already in progress for '{active}'")]
    Conflict { active: PluginSlug },

    #[error("plugin '{0}' has already been fuzzed")]
    AlreadyProcessed(PluginSlug),

    #[error("plugin '{0}' not found")]
    NotFound(String),

    #[error("plugin catalog unavailable: {0}")]
    UpstreamUnavailable(String),

    #[error("invalid plugin slug: {0}")]
    InvalidTarget(#[from] SlugError),

    #[error(transparent)]
    Spawn(#[from] FuzzerError),

    #[error("archived result for '{target}' is not valid JSON: {reason}")]
    Artifact { target: PluginSlug, reason: String },

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from archiving a finished run
#[derive(Debug, Error)]
pub enum ArchiveError {
    #[error("post-processing failed: {0}")]
    PostProcess(#[from] CommandError),

    #[error("no result artifact for '{target}' in {}", dir.display())]
    ArtifactMissing { target: PluginSlug, dir: PathBuf },

    #[error("failed to move result artifact: {0}")]
    Io(#[from] std::io::Error),
}
