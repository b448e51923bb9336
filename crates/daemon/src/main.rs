// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `wfd`: supervises WordPress plugin fuzz runs behind an HTTP API.
//!
//! Prints `READY <addr>` on stdout once the listener is bound, then serves
//! until SIGINT or SIGTERM.

use std::io::Write;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{error, info};
use wf_daemon::lifecycle::{self, Config, LifecycleError};
use wf_daemon::listener::Listener;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("wfd: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), LifecycleError> {
    let config = Config::load()?;
    std::fs::create_dir_all(&config.state_dir)?;
    let _log_guard = lifecycle::init_logging(&config.log_path)?;

    let lifecycle::StartupResult { mut daemon, listener } =
        match lifecycle::startup(&config).await {
            Ok(result) => result,
            Err(e) => {
                error!(error = %e, "startup failed");
                return Err(e);
            }
        };
    let addr = listener.local_addr()?;
    info!(%addr, pid = std::process::id(), "daemon listening");

    let shutdown = CancellationToken::new();
    let ctx = Arc::new(daemon.listen_ctx());
    let listen_task = tokio::spawn(Listener::new(listener, ctx, shutdown.clone()).run());

    {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "READY {}", addr)?;
        stdout.flush()?;
    }

    wait_for_signal().await?;
    info!("shutdown signal received");

    shutdown.cancel();
    if let Err(e) = listen_task.await {
        error!(error = %e, "listener task failed");
    }
    daemon.shutdown()
}

#[cfg(unix)]
async fn wait_for_signal() -> std::io::Result<()> {
    use tokio::signal::unix::{signal, SignalKind};

    let mut terminate = signal(SignalKind::terminate())?;
    tokio::select! {
        result = tokio::signal::ctrl_c() => result,
        _ = terminate.recv() => Ok(()),
    }
}

#[cfg(not(unix))]
async fn wait_for_signal() -> std::io::Result<()> {
    tokio::signal::ctrl_c().await
}
