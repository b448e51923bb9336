// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Fuzz-run supervision: launching the fuzz tool, watching it, archiving
//! its results, and answering state/history queries.

mod archiver;
mod error;
mod history;
mod supervisor;
mod watcher;

pub use archiver::Archiver;
pub use error::{ArchiveError, SupervisorError};
pub use history::History;
pub use supervisor::{StartAccepted, Supervisor, SupervisorConfig, SupervisorDeps};
pub use watcher::RunFinished;
