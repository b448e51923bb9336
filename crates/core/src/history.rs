// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::PluginSlug;

/// A completed, archived fuzz run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub target: PluginSlug,
    /// Where the archived JSON artifact lives
    pub location: PathBuf,
    pub archived_at_ms: u64,
}
