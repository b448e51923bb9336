// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Archiving a finished fuzz run.
//!
//! Post-process the raw output, pick the findings artifact out of the fuzz
//! tool's results directory, move it into the archive as `<slug>.json`, and
//! tear the containers down. Teardown runs whatever happened before it.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use wf_adapters::{PostProcessAdapter, TeardownAdapter};
use wf_core::PluginSlug;

use crate::error::ArchiveError;

/// Filesystems with coarse timestamps can stamp a file written just after the
/// run started with an earlier time
const MTIME_SLACK: Duration = Duration::from_secs(2);

#[derive(Clone)]
pub struct Archiver<P, T> {
    postprocess: P,
    teardown: T,
    results_dir: PathBuf,
    archive_dir: PathBuf,
}

impl<P, T> Archiver<P, T>
where
    P: PostProcessAdapter,
    T: TeardownAdapter,
{
    pub fn new(postprocess: P, teardown: T, results_dir: PathBuf, archive_dir: PathBuf) -> Self {
        Self { postprocess, teardown, results_dir, archive_dir }
    }

    pub fn archive_dir(&self) -> &Path {
        &self.archive_dir
    }

    /// Archive the run for `target` started at `started_at`, then tear down.
    /// Returns the archived artifact's location.
    pub async fn archive(
        &self,
        target: &PluginSlug,
        started_at: SystemTime,
    ) -> Result<PathBuf, ArchiveError> {
        let result = self.archive_artifact(target, started_at).await;

        if let Err(e) = self.teardown.teardown().await {
            tracing::warn!(plugin = %target, error = %e, "teardown failed");
        }

        result
    }

    async fn archive_artifact(
        &self,
        target: &PluginSlug,
        started_at: SystemTime,
    ) -> Result<PathBuf, ArchiveError> {
        self.postprocess.process(target).await?;

        let since = started_at.checked_sub(MTIME_SLACK).unwrap_or(SystemTime::UNIX_EPOCH);
        let source = locate_artifact(&self.results_dir, target, since)?.ok_or_else(|| {
            ArchiveError::ArtifactMissing { target: target.clone(), dir: self.results_dir.clone() }
        })?;

        let dest = self.archive_dir.join(target.artifact_file_name());
        move_artifact(&source, &dest)?;
        tracing::info!(
            plugin = %target,
            from = %source.display(),
            to = %dest.display(),
            "archived fuzz results"
        );
        Ok(dest)
    }
}

/// Find the newest `*.json` file in `dir` named for `target` and modified at
/// or after `since`. A missing directory means no artifact.
pub(crate) fn locate_artifact(
    dir: &Path,
    target: &PluginSlug,
    since: SystemTime,
) -> std::io::Result<Option<PathBuf>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    let mut newest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        let name = entry.file_name();
        let Some(name) = name.to_str() else { continue };
        let Some(stem) = name.strip_suffix(".json") else { continue };
        if !names_target(stem, target) {
            continue;
        }
        let meta = entry.metadata()?;
        if !meta.is_file() {
            continue;
        }
        let mtime = meta.modified().unwrap_or(SystemTime::UNIX_EPOCH);
        if mtime < since {
            continue;
        }
        match &newest {
            Some((best, _)) if *best >= mtime => {}
            _ => newest = Some((mtime, entry.path())),
        }
    }
    Ok(newest.map(|(_, path)| path))
}

/// The fuzz tool names results `<slug>.json` or `<slug>_<suffix>.json`.
/// Slugs may contain `-` and `.`, so only `_` separates the suffix.
fn names_target(stem: &str, target: &PluginSlug) -> bool {
    match stem.strip_prefix(target.as_str()) {
        Some(rest) => rest.is_empty() || rest.starts_with('_'),
        None => false,
    }
}

/// Move `source` to `dest`, creating the destination directory. Falls back to
/// copy and remove when a rename crosses filesystems.
pub(crate) fn move_artifact(source: &Path, dest: &Path) -> std::io::Result<()> {
    if let Some(parent) = dest.parent() {
        std::fs::create_dir_all(parent)?;
    }
    if std::fs::rename(source, dest).is_ok() {
        return Ok(());
    }
    std::fs::copy(source, dest)?;
    std::fs::remove_file(source)
}

#[cfg(test)]
#[path = "archiver_tests.rs"]
mod tests;
