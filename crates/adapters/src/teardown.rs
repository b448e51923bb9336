// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Teardown of the containers a fuzz run leaves behind.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;

use crate::subprocess::{require_success, run_with_timeout, CommandError, CommandLine};

/// Adapter for releasing auxiliary resources after a run
#[async_trait]
pub trait TeardownAdapter: Clone + Send + Sync + 'static {
    async fn teardown(&self) -> Result<(), CommandError>;
}

/// Runs a teardown command (e.g. `docker-compose down`) in the fuzzer checkout
#[derive(Debug, Clone)]
pub struct CommandTeardown {
    command: CommandLine,
    cwd: PathBuf,
    timeout: Duration,
}

impl CommandTeardown {
    pub fn new(command: CommandLine, cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { command, cwd: cwd.into(), timeout }
    }
}

#[async_trait]
impl TeardownAdapter for CommandTeardown {
    async fn teardown(&self) -> Result<(), CommandError> {
        let description = format!("teardown `{}`", self.command);
        let cmd = self.command.command(&self.cwd, &[]);
        let output = run_with_timeout(cmd, self.timeout, &description).await?;
        require_success(output, &description)?;
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::TeardownAdapter;
    use crate::subprocess::CommandError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[derive(Default)]
    struct FakeTeardownState {
        calls: usize,
        fail: bool,
    }

    /// Fake teardown; counts calls and optionally fails
    #[derive(Clone, Default)]
    pub struct FakeTeardown {
        inner: Arc<Mutex<FakeTeardownState>>,
    }

    impl FakeTeardown {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_fail(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        pub fn calls(&self) -> usize {
            self.inner.lock().calls
        }
    }

    #[async_trait]
    impl TeardownAdapter for FakeTeardown {
        async fn teardown(&self) -> Result<(), CommandError> {
            let mut inner = self.inner.lock();
            inner.calls += 1;
            if inner.fail {
                return Err(CommandError::Failed {
                    description: "fake teardown".to_string(),
                    code: 1,
                    stderr: "containers stuck".to_string(),
                });
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeTeardown;
