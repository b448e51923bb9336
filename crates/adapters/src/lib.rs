// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Adapters for the external collaborators of a fuzz run: the plugin
//! catalog, the fuzz tool process, the post-processing step, and container
//! teardown.

pub mod catalog;
pub mod fuzzer;
pub mod postprocess;
pub mod subprocess;
pub mod teardown;

pub use catalog::{CatalogAdapter, CatalogError, PluginInfo, WordPressCatalog};
pub use fuzzer::{FuzzProcess, FuzzerAdapter, FuzzerError, ProcessExit, ProcessFuzzer};
pub use postprocess::{CommandPostProcessor, PostProcessAdapter};
pub use subprocess::{CommandError, CommandLine};
pub use teardown::{CommandTeardown, TeardownAdapter};

#[cfg(any(test, feature = "test-support"))]
pub use catalog::FakeCatalog;
#[cfg(any(test, feature = "test-support"))]
pub use fuzzer::{FakeFuzzer, FakeRun};
#[cfg(any(test, feature = "test-support"))]
pub use postprocess::FakePostProcessor;
#[cfg(any(test, feature = "test-support"))]
pub use teardown::FakeTeardown;
