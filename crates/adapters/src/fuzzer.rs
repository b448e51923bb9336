// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Launching the external fuzz tool.
//!
//! The fuzz tool is an unmodified third-party program invoked with the plugin
//! slug as its only argument. It drives its own Docker containers and writes
//! raw findings under its results directory; this adapter only starts it and
//! hands back a handle the watcher can wait on.

use std::path::PathBuf;
use std::process::Stdio;

use async_trait::async_trait;
use thiserror::Error;
use wf_core::PluginSlug;

use crate::subprocess::CommandLine;

/// Errors from the fuzz tool process
#[derive(Debug, Error)]
pub enum FuzzerError {
    #[error("failed to start fuzzer: {0}")]
    Spawn(String),

    #[error("failed to wait on fuzzer: {0}")]
    Wait(String),

    #[error("failed to kill fuzzer: {0}")]
    Kill(String),
}

/// Exit of a fuzz process. `code` is `None` when it was ended by a signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    pub code: Option<i32>,
}

/// Handle to a running fuzz process, owned by exactly one watcher
#[async_trait]
pub trait FuzzProcess: Send + 'static {
    /// OS process id, if known
    fn id(&self) -> Option<u32>;

    /// Wait for the process to exit. Cancel-safe: dropping the future leaves
    /// the process running and a later call waits again.
    async fn wait(&mut self) -> Result<ProcessExit, FuzzerError>;

    /// Forcefully terminate the process
    async fn kill(&mut self) -> Result<(), FuzzerError>;
}

/// Adapter for starting fuzz runs
#[async_trait]
pub trait FuzzerAdapter: Clone + Send + Sync + 'static {
    /// Start the fuzz tool against `target`. Returns as soon as the process
    /// is running; it continues independently of the caller.
    async fn spawn(&self, target: &PluginSlug) -> Result<Box<dyn FuzzProcess>, FuzzerError>;
}

/// Runs the fuzz tool as a child process in its checkout directory
#[derive(Debug, Clone)]
pub struct ProcessFuzzer {
    command: CommandLine,
    cwd: PathBuf,
}

impl ProcessFuzzer {
    pub fn new(command: CommandLine, cwd: impl Into<PathBuf>) -> Self {
        Self { command, cwd: cwd.into() }
    }
}

#[async_trait]
impl FuzzerAdapter for ProcessFuzzer {
    async fn spawn(&self, target: &PluginSlug) -> Result<Box<dyn FuzzProcess>, FuzzerError> {
        if !self.cwd.is_dir() {
            return Err(FuzzerError::Spawn(format!(
                "fuzzer directory {} does not exist",
                self.cwd.display()
            )));
        }

        let mut cmd = self.command.command(&self.cwd, &[target.as_str()]);
        // Output goes nowhere; findings are collected from the results directory.
        // kill_on_drop ties the run to the daemon's lifetime.
        cmd.stdin(Stdio::null()).stdout(Stdio::null()).stderr(Stdio::null()).kill_on_drop(true);

        let child = cmd.spawn().map_err(|e| FuzzerError::Spawn(format!("{}: {}", self.command, e)))?;
        tracing::info!(
            plugin = %target,
            pid = ?child.id(),
            command = %self.command,
            cwd = %self.cwd.display(),
            "fuzzer process spawned"
        );
        Ok(Box::new(ChildProcess { child }))
    }
}

struct ChildProcess {
    child: tokio::process::Child,
}

#[async_trait]
impl FuzzProcess for ChildProcess {
    fn id(&self) -> Option<u32> {
        self.child.id()
    }

    async fn wait(&mut self) -> Result<ProcessExit, FuzzerError> {
        let status = self.child.wait().await.map_err(|e| FuzzerError::Wait(e.to_string()))?;
        Ok(ProcessExit { code: status.code() })
    }

    async fn kill(&mut self) -> Result<(), FuzzerError> {
        self.child.kill().await.map_err(|e| FuzzerError::Kill(e.to_string()))
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::{FuzzProcess, FuzzerAdapter, FuzzerError, ProcessExit};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::oneshot;
    use wf_core::PluginSlug;

    #[derive(Default)]
    struct FakeFuzzerState {
        exits: HashMap<String, oneshot::Sender<i32>>,
        spawned: Vec<String>,
        killed: Vec<String>,
        fail_spawn: bool,
    }

    /// Fake fuzz tool. Each spawned run stays alive until the test calls
    /// [`FakeFuzzer::finish`] (or the watcher kills it).
    #[derive(Clone, Default)]
    pub struct FakeFuzzer {
        inner: Arc<Mutex<FakeFuzzerState>>,
    }

    impl FakeFuzzer {
        pub fn new() -> Self {
            Self::default()
        }

        /// Make the next spawns fail
        pub fn set_fail_spawn(&self, fail: bool) {
            self.inner.lock().fail_spawn = fail;
        }

        /// Let the run for `slug` exit with `code`. Returns false if no such
        /// run is waiting.
        pub fn finish(&self, slug: &str, code: i32) -> bool {
            match self.inner.lock().exits.remove(slug) {
                Some(tx) => tx.send(code).is_ok(),
                None => false,
            }
        }

        /// Slugs spawned so far, in order
        pub fn spawned(&self) -> Vec<String> {
            self.inner.lock().spawned.clone()
        }

        /// Slugs whose runs were killed
        pub fn killed(&self) -> Vec<String> {
            self.inner.lock().killed.clone()
        }
    }

    #[async_trait]
    impl FuzzerAdapter for FakeFuzzer {
        async fn spawn(&self, target: &PluginSlug) -> Result<Box<dyn FuzzProcess>, FuzzerError> {
            let mut inner = self.inner.lock();
            if inner.fail_spawn {
                return Err(FuzzerError::Spawn("fake spawn failure".to_string()));
            }
            let (tx, rx) = oneshot::channel();
            inner.exits.insert(target.to_string(), tx);
            inner.spawned.push(target.to_string());
            Ok(Box::new(FakeRun {
                target: target.to_string(),
                exit: rx,
                killed: false,
                state: Arc::clone(&self.inner),
            }))
        }
    }

    /// Process handle produced by [`FakeFuzzer`]
    pub struct FakeRun {
        target: String,
        exit: oneshot::Receiver<i32>,
        killed: bool,
        state: Arc<Mutex<FakeFuzzerState>>,
    }

    #[async_trait]
    impl FuzzProcess for FakeRun {
        fn id(&self) -> Option<u32> {
            None
        }

        async fn wait(&mut self) -> Result<ProcessExit, FuzzerError> {
            if self.killed {
                return Ok(ProcessExit { code: None });
            }
            match (&mut self.exit).await {
                Ok(code) => Ok(ProcessExit { code: Some(code) }),
                // Sender dropped without an exit code: treat as killed externally
                Err(_) => Ok(ProcessExit { code: None }),
            }
        }

        async fn kill(&mut self) -> Result<(), FuzzerError> {
            self.killed = true;
            let mut state = self.state.lock();
            state.exits.remove(&self.target);
            state.killed.push(self.target.clone());
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeFuzzer, FakeRun};

#[cfg(test)]
#[path = "fuzzer_tests.rs"]
mod tests;
