// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Run identifiers

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

/// Identifier of a single fuzz run.
///
/// Format is `run-{nanoid}` (23 characters, fits `SmolStr` inline). A target
/// slug is fuzzed at most once, but the id still distinguishes a run from the
/// start reservation that preceded it in logs.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(SmolStr);

impl RunId {
    pub const PREFIX: &'static str = "run-";

    /// Generate a new random run id
    pub fn new() -> Self {
        Self(SmolStr::new(format!("{}{}", Self::PREFIX, nanoid::nanoid!(19))))
    }

    pub fn from_string(id: impl Into<SmolStr>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First `n` characters of the random part, for compact display
    pub fn short(&self, n: usize) -> &str {
        let suffix = self.0.strip_prefix(Self::PREFIX).unwrap_or(&self.0);
        &suffix[..n.min(suffix.len())]
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for RunId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
#[path = "id_tests.rs"]
mod tests;
