// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! wf-core: Core types for the WordPress plugin fuzz-run supervisor

pub mod macros;

pub mod clock;
pub mod findings;
pub mod history;
pub mod id;
pub mod run;
pub mod slug;
pub mod time_fmt;

pub use clock::{Clock, FakeClock, SystemClock};
pub use findings::{CommandResult, Findings};
pub use history::HistoryEntry;
pub use id::RunId;
pub use run::{ActiveRun, RunFailure, RunOutcome, RunState};
pub use slug::{PluginSlug, SlugError};
pub use time_fmt::format_elapsed;
