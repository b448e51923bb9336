// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Centralized environment variable access for the daemon crate.

use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;
use std::time::Duration;

use crate::lifecycle::LifecycleError;

/// Protocol version (from Cargo.toml)
pub const PROTOCOL_VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_HTTP_PORT: u16 = 8000;
pub const DEFAULT_FUZZER_DIR: &str = "wpgarlic";
pub const DEFAULT_FUZZER_CMD: &str = "python3 fuzz_plugin.py";
pub const DEFAULT_POSTPROCESS_CMD: &str = "python3 print_findings.py";
pub const DEFAULT_TEARDOWN_CMD: &str = "docker-compose down";

/// Raw results location inside the fuzzer checkout
pub const RESULTS_SUBDIR: &str = "data/plugin_fuzz_results";

/// Resolve state directory: WF_STATE_DIR > XDG_STATE_HOME/wf > ~/.local/state/wf
pub fn state_dir() -> Result<PathBuf, LifecycleError> {
    if let Ok(dir) = std::env::var("WF_STATE_DIR") {
        return Ok(PathBuf::from(dir));
    }
    if let Ok(xdg) = std::env::var("XDG_STATE_HOME") {
        return Ok(PathBuf::from(xdg).join("wf"));
    }
    let home = std::env::var("HOME").map_err(|_| LifecycleError::NoStateDir)?;
    Ok(PathBuf::from(home).join(".local/state/wf"))
}

/// HTTP port (default 8000). Port 0 binds an ephemeral port.
pub fn http_port() -> u16 {
    std::env::var("WF_HTTP_PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(DEFAULT_HTTP_PORT)
}

/// Bind address (default loopback)
pub fn bind_addr() -> IpAddr {
    std::env::var("WF_BIND_ADDR")
        .ok()
        .and_then(|s| s.parse::<IpAddr>().ok())
        .unwrap_or(IpAddr::V4(Ipv4Addr::LOCALHOST))
}

/// Address the daemon listens on and clients connect to
pub fn daemon_addr() -> SocketAddr {
    SocketAddr::new(bind_addr(), http_port())
}

/// Fuzz tool checkout directory
pub fn fuzzer_dir() -> PathBuf {
    std::env::var("WF_FUZZER_DIR")
        .ok()
        .filter(|s| !s.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_FUZZER_DIR))
}

pub fn fuzzer_command() -> String {
    non_empty_var("WF_FUZZER_CMD").unwrap_or_else(|| DEFAULT_FUZZER_CMD.to_string())
}

pub fn postprocess_command() -> String {
    non_empty_var("WF_POSTPROCESS_CMD").unwrap_or_else(|| DEFAULT_POSTPROCESS_CMD.to_string())
}

pub fn teardown_command() -> String {
    non_empty_var("WF_TEARDOWN_CMD").unwrap_or_else(|| DEFAULT_TEARDOWN_CMD.to_string())
}

/// Raw results directory override. Defaults to `<fuzzer_dir>/data/plugin_fuzz_results`.
pub fn results_dir() -> Option<PathBuf> {
    non_empty_var("WF_RESULTS_DIR").map(PathBuf::from)
}

pub fn catalog_url() -> String {
    non_empty_var("WF_CATALOG_URL")
        .unwrap_or_else(|| wf_adapters::catalog::WORDPRESS_CATALOG_URL.to_string())
}

/// Plugin catalog lookup timeout (default 30s)
pub fn catalog_timeout() -> Duration {
    std::env::var("WF_CATALOG_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(30))
}

/// Maximum fuzz run duration before the process is killed (default 6h)
pub fn max_run_duration() -> Duration {
    std::env::var("WF_MAX_RUN_SECS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_secs)
        .unwrap_or(Duration::from_secs(6 * 60 * 60))
}

/// Default IPC timeout
pub fn ipc_timeout() -> Duration {
    std::env::var("WF_IPC_TIMEOUT_MS")
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_secs(5))
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|s| !s.trim().is_empty())
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
