// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon startup and initialization logic.

use std::io::Write;
use std::time::Instant;

use fs2::FileExt;
use tokio::net::TcpListener;
use tracing::info;
use wf_adapters::subprocess::{POSTPROCESS_TIMEOUT, TEARDOWN_TIMEOUT};
use wf_adapters::{CommandPostProcessor, CommandTeardown, ProcessFuzzer, WordPressCatalog};
use wf_core::SystemClock;
use wf_engine::{History, Supervisor, SupervisorConfig, SupervisorDeps};

use super::{Config, DaemonState, LifecycleError, StartupResult};

/// Start the daemon
pub async fn startup(config: &Config) -> Result<StartupResult, LifecycleError> {
    match startup_inner(config).await {
        Ok(result) => Ok(result),
        Err(e) => {
            // Skip cleanup when the lock was held elsewhere:
            // those files belong to the already-running daemon.
            if !matches!(e, LifecycleError::LockFailed(_)) {
                cleanup_on_failure(config);
            }
            Err(e)
        }
    }
}

/// Inner startup logic - cleanup_on_failure called if this fails
async fn startup_inner(config: &Config) -> Result<StartupResult, LifecycleError> {
    // 1. Create state directory (needed for lock, log, archive)
    std::fs::create_dir_all(&config.state_dir)?;

    // 2. Acquire lock file FIRST - prevents races
    // Use OpenOptions to avoid truncating the file before we hold the lock,
    // which would wipe the running daemon's PID.
    let lock_file = std::fs::OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(false)
        .open(&config.lock_path)?;
    lock_file.try_lock_exclusive().map_err(LifecycleError::LockFailed)?;

    // Write PID to lock file (truncate now that we hold the lock)
    let mut lock_file = lock_file;
    lock_file.set_len(0)?;
    writeln!(lock_file, "{}", std::process::id())?;
    let lock_file = lock_file; // Drop mutability

    // 3. Create directories
    std::fs::create_dir_all(&config.archive_dir)?;

    // 4. Rebuild history from the archive
    let history = History::load(&config.archive_dir)?;
    info!(archived = history.len(), archive = %config.archive_dir.display(), "loaded history");

    // 5. Set up adapters
    let catalog = WordPressCatalog::new(config.catalog_url.clone(), config.catalog_timeout)?;
    let fuzzer = ProcessFuzzer::new(config.fuzzer_command.clone(), config.fuzzer_dir.clone());
    let postprocess = CommandPostProcessor::new(
        config.postprocess_command.clone(),
        config.fuzzer_dir.clone(),
        POSTPROCESS_TIMEOUT,
    );
    let teardown = CommandTeardown::new(
        config.teardown_command.clone(),
        config.fuzzer_dir.clone(),
        TEARDOWN_TIMEOUT,
    );
    if !config.fuzzer_dir.is_dir() {
        tracing::warn!(
            dir = %config.fuzzer_dir.display(),
            "fuzzer directory does not exist; runs will fail to start"
        );
    }

    // 6. Create supervisor
    let supervisor = Supervisor::spawn(
        SupervisorDeps { catalog, fuzzer, postprocess, teardown },
        SupervisorConfig {
            results_dir: config.results_dir.clone(),
            archive_dir: config.archive_dir.clone(),
            catalog_timeout: config.catalog_timeout,
            max_run_duration: config.max_run_duration,
        },
        SystemClock,
        history,
    );

    // 7. Bind (LAST - only after all validation passes)
    let listener = TcpListener::bind(config.listen_addr)
        .await
        .map_err(|e| LifecycleError::BindFailed(config.listen_addr, e))?;

    info!(
        addr = %config.listen_addr,
        fuzzer_dir = %config.fuzzer_dir.display(),
        catalog = %config.catalog_url,
        "Daemon started"
    );

    Ok(StartupResult {
        daemon: DaemonState {
            config: config.clone(),
            lock_file,
            supervisor,
            start_time: Instant::now(),
        },
        listener,
    })
}

/// Clean up resources on startup failure
fn cleanup_on_failure(config: &Config) {
    // Remove PID/lock file
    if config.lock_path.exists() {
        let _ = std::fs::remove_file(&config.lock_path);
    }
}

#[cfg(test)]
#[path = "startup_tests.rs"]
mod tests;
