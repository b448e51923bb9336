// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! CLI command implementations

pub mod fuzz;
pub mod history;
pub mod result;
pub mod state;
pub mod status;

use crate::client::ClientError;
use crate::exit_error::{ExitError, EXIT_REJECTED, EXIT_UNREACHABLE};

/// Map a client error to the exit code and message the user sees
pub(crate) fn exit_error(err: ClientError) -> anyhow::Error {
    let code = if err.is_unreachable() { EXIT_UNREACHABLE } else { EXIT_REJECTED };
    ExitError::new(code, err.to_string()).into()
}
