// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Post-processing of raw fuzz output into a findings artifact.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use wf_core::PluginSlug;

use crate::subprocess::{require_success, run_with_timeout, CommandError, CommandLine};

/// Adapter for the step that turns raw fuzz output into the JSON artifact
/// the archiver picks up
#[async_trait]
pub trait PostProcessAdapter: Clone + Send + Sync + 'static {
    async fn process(&self, target: &PluginSlug) -> Result<(), CommandError>;
}

/// Runs a post-processing command in the fuzzer checkout with the slug appended
#[derive(Debug, Clone)]
pub struct CommandPostProcessor {
    command: CommandLine,
    cwd: PathBuf,
    timeout: Duration,
}

impl CommandPostProcessor {
    pub fn new(command: CommandLine, cwd: impl Into<PathBuf>, timeout: Duration) -> Self {
        Self { command, cwd: cwd.into(), timeout }
    }
}

#[async_trait]
impl PostProcessAdapter for CommandPostProcessor {
    async fn process(&self, target: &PluginSlug) -> Result<(), CommandError> {
        let description = format!("post-processing `{}`", self.command);
        let cmd = self.command.command(&self.cwd, &[target.as_str()]);
        let output = run_with_timeout(cmd, self.timeout, &description).await?;
        let output = require_success(output, &description)?;
        if !output.stdout.is_empty() {
            tracing::debug!(
                plugin = %target,
                stdout = %String::from_utf8_lossy(&output.stdout),
                "post-processing output"
            );
        }
        Ok(())
    }
}

#[cfg(any(test, feature = "test-support"))]
#[cfg_attr(coverage_nightly, coverage(off))]
mod fake {
    use super::PostProcessAdapter;
    use crate::subprocess::CommandError;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::Arc;
    use wf_core::PluginSlug;

    #[derive(Default)]
    struct FakePostProcessState {
        calls: Vec<String>,
        fail: bool,
    }

    /// Fake post-processor; records calls and optionally fails
    #[derive(Clone, Default)]
    pub struct FakePostProcessor {
        inner: Arc<Mutex<FakePostProcessState>>,
    }

    impl FakePostProcessor {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn set_fail(&self, fail: bool) {
            self.inner.lock().fail = fail;
        }

        pub fn calls(&self) -> Vec<String> {
            self.inner.lock().calls.clone()
        }
    }

    #[async_trait]
    impl PostProcessAdapter for FakePostProcessor {
        async fn process(&self, target: &PluginSlug) -> Result<(), CommandError> {
            let mut inner = self.inner.lock();
            inner.calls.push(target.to_string());
            if inner.fail {
                return Err(CommandError::Failed {
                    description: "fake post-processing".to_string(),
                    code: 1,
                    stderr: "fake failure".to_string(),
                });
            }
            Ok(())
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakePostProcessor;
