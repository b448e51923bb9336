// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP protocol between `wfd` and its clients.
//!
//! Wire format: HTTP/1.1 with JSON bodies, one request per connection,
//! `Content-Length` framing.

mod http;
mod types;

pub use http::{
    read_request, reason_phrase, write_response, HttpRequest, HttpResponse, ProtocolError,
    MAX_BODY_BYTES, MAX_HEAD_BYTES,
};
pub use types::{ErrorBody, FuzzerStatus, HistoryBody, StartedBody, StatusReport, ToolStatus};

pub const STATE_PATH: &str = "/fuzz_plugin/state";
pub const HISTORY_PATH: &str = "/fuzz_plugin/history";
pub const STATUS_PATH: &str = "/status";

/// Path that starts a fuzz run for `target`
pub fn fuzz_path(target: &str) -> String {
    format!("/fuzz_plugin/{}", target)
}

/// Path of the archived results for `target`
pub fn results_path(target: &str) -> String {
    format!("/fuzz_plugin/results/{}", target)
}
