// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! History of archived runs.
//!
//! The archive directory is the source of truth: every `<slug>.json` in it is
//! a completed run. The in-memory map is rebuilt from it at startup and kept
//! in step by the archiver afterwards.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::Path;
use std::time::UNIX_EPOCH;

use wf_core::{HistoryEntry, PluginSlug};

#[derive(Debug, Clone, Default)]
pub struct History {
    entries: BTreeMap<PluginSlug, HistoryEntry>,
}

impl History {
    /// Rebuild history from an archive directory. A missing directory is an
    /// empty history.
    pub fn load(archive_dir: &Path) -> std::io::Result<Self> {
        let mut history = Self::default();
        let dir = match std::fs::read_dir(archive_dir) {
            Ok(dir) => dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(history),
            Err(e) => return Err(e),
        };

        for entry in dir {
            let entry = entry?;
            let path = entry.path();
            if path.extension() != Some(OsStr::new("json")) || !entry.file_type()?.is_file() {
                continue;
            }
            let Some(stem) = path.file_stem().and_then(OsStr::to_str) else {
                continue;
            };
            let target = match PluginSlug::parse(stem) {
                Ok(target) => target,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping archive file");
                    continue;
                }
            };
            let archived_at_ms = entry
                .metadata()?
                .modified()
                .ok()
                .and_then(|mtime| mtime.duration_since(UNIX_EPOCH).ok())
                .map(|d| d.as_millis() as u64)
                .unwrap_or(0);
            history.entries.insert(
                target.clone(),
                HistoryEntry { target, location: path, archived_at_ms },
            );
        }
        Ok(history)
    }

    pub fn contains(&self, target: &PluginSlug) -> bool {
        self.entries.contains_key(target)
    }

    pub fn get(&self, target: &PluginSlug) -> Option<&HistoryEntry> {
        self.entries.get(target)
    }

    /// Record an archived run. Returns false (and keeps the existing entry)
    /// if the target is already present.
    pub fn insert(&mut self, entry: HistoryEntry) -> bool {
        if self.entries.contains_key(&entry.target) {
            return false;
        }
        self.entries.insert(entry.target.clone(), entry);
        true
    }

    /// Archived targets in slug order
    pub fn targets(&self) -> Vec<PluginSlug> {
        self.entries.keys().cloned().collect()
    }

    pub fn entries(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
#[path = "history_tests.rs"]
mod tests;
