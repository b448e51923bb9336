// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon lifecycle management: configuration, startup, shutdown.

mod logging;
mod startup;
pub use logging::init_logging;
pub use startup::startup;

use std::fs::File;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::{Duration, Instant};

use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{info, warn};
use wf_adapters::{
    CatalogError, CommandLine, CommandPostProcessor, CommandTeardown, ProcessFuzzer,
    WordPressCatalog,
};
use wf_engine::Supervisor;

use crate::env;
use crate::listener::{ListenCtx, ToolCheck};

/// Supervisor with concrete adapter types
pub type DaemonSupervisor =
    Supervisor<WordPressCatalog, ProcessFuzzer, CommandPostProcessor, CommandTeardown>;

/// Daemon configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Root state directory (e.g. ~/.local/state/wf)
    pub state_dir: PathBuf,
    /// Path to lock/PID file
    pub lock_path: PathBuf,
    /// Path to daemon log file
    pub log_path: PathBuf,
    /// Archived `<slug>.json` artifacts
    pub archive_dir: PathBuf,
    pub listen_addr: SocketAddr,
    /// Fuzz tool checkout; every external command runs here
    pub fuzzer_dir: PathBuf,
    pub fuzzer_command: CommandLine,
    pub postprocess_command: CommandLine,
    pub teardown_command: CommandLine,
    /// Where the fuzz tool writes raw results
    pub results_dir: PathBuf,
    pub catalog_url: String,
    pub catalog_timeout: Duration,
    pub max_run_duration: Duration,
    pub ipc_timeout: Duration,
}

impl Config {
    /// Load configuration from the environment
    pub fn load() -> Result<Self, LifecycleError> {
        let state_dir = env::state_dir()?;
        let fuzzer_dir = env::fuzzer_dir();

        Ok(Self {
            lock_path: state_dir.join("daemon.pid"),
            log_path: state_dir.join("daemon.log"),
            archive_dir: state_dir.join("archive"),
            listen_addr: env::daemon_addr(),
            fuzzer_command: parse_command("WF_FUZZER_CMD", &env::fuzzer_command())?,
            postprocess_command: parse_command("WF_POSTPROCESS_CMD", &env::postprocess_command())?,
            teardown_command: parse_command("WF_TEARDOWN_CMD", &env::teardown_command())?,
            results_dir: env::results_dir()
                .unwrap_or_else(|| fuzzer_dir.join(env::RESULTS_SUBDIR)),
            catalog_url: env::catalog_url(),
            catalog_timeout: env::catalog_timeout(),
            max_run_duration: env::max_run_duration(),
            ipc_timeout: env::ipc_timeout(),
            fuzzer_dir,
            state_dir,
        })
    }
}

fn parse_command(var: &str, raw: &str) -> Result<CommandLine, LifecycleError> {
    CommandLine::parse(raw)
        .ok_or_else(|| LifecycleError::InvalidConfig(format!("{} is empty", var)))
}

/// Daemon state during operation.
///
/// The listener is returned separately from startup to be spawned as a Listener task.
pub struct DaemonState {
    /// Configuration
    pub config: Config,
    // NOTE(lifetime): Held to maintain exclusive file lock; released on drop
    #[allow(dead_code)]
    lock_file: File,
    pub supervisor: DaemonSupervisor,
    /// When daemon started
    pub start_time: Instant,
}

/// Result of daemon startup - includes both the daemon state and the listener.
pub struct StartupResult {
    pub daemon: DaemonState,
    /// The bound TCP listener to spawn as a task
    pub listener: TcpListener,
}

impl DaemonState {
    /// Context shared by all request handlers
    pub fn listen_ctx(
        &self,
    ) -> ListenCtx<WordPressCatalog, ProcessFuzzer, CommandPostProcessor, CommandTeardown> {
        ListenCtx {
            supervisor: self.supervisor.clone(),
            fuzzer_dir: self.config.fuzzer_dir.clone(),
            fuzzer_entry: fuzzer_entry(&self.config.fuzzer_command),
            tool_checks: ToolCheck::defaults(),
            start_time: self.start_time,
            ipc_timeout: self.config.ipc_timeout,
        }
    }

    /// Shutdown the daemon gracefully.
    ///
    /// An in-flight fuzz process is killed when the runtime drops its
    /// watcher (`kill_on_drop`); its results are not archived.
    pub fn shutdown(&mut self) -> Result<(), LifecycleError> {
        info!("Shutting down daemon...");

        if let Some(run) = self.supervisor.active() {
            warn!(run_id = %run.id, plugin = %run.target, "abandoning active fuzz run");
        }

        // Remove PID file; the lock is released when self.lock_file is dropped
        if self.config.lock_path.exists() {
            if let Err(e) = std::fs::remove_file(&self.config.lock_path) {
                warn!("Failed to remove PID file: {}", e);
            }
        }

        info!("Daemon shutdown complete");
        Ok(())
    }
}

/// The script the fuzz command runs, relative to the checkout: the first
/// argument if there is one (`python3 fuzz_plugin.py`), else the program.
fn fuzzer_entry(command: &CommandLine) -> PathBuf {
    PathBuf::from(command.args().first().map(String::as_str).unwrap_or(command.program()))
}

/// Lifecycle errors
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("Could not determine state directory")]
    NoStateDir,

    #[error("Failed to acquire lock: daemon already running?")]
    LockFailed(#[source] std::io::Error),

    #[error("Failed to bind {0}: {1}")]
    BindFailed(SocketAddr, std::io::Error),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Catalog client error: {0}")]
    Catalog(#[from] CatalogError),

    #[error("Failed to initialize logging: {0}")]
    Logging(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
