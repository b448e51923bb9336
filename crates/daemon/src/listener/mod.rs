// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Listener task for the HTTP API.
//!
//! The Listener runs in a spawned task, accepting connections and handling
//! each one on its own task so a slow client never blocks the others.

mod routes;
mod status;

pub use routes::handle_request;
pub use status::ToolCheck;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpStream};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};
use wf_adapters::{CatalogAdapter, FuzzerAdapter, PostProcessAdapter, TeardownAdapter};
use wf_engine::Supervisor;

use crate::protocol::{self, ErrorBody, HttpResponse, ProtocolError};

/// Shared daemon context for all request handlers.
pub struct ListenCtx<C, F, P, T> {
    pub supervisor: Supervisor<C, F, P, T>,
    /// Fuzz tool checkout, reported on `/status`
    pub fuzzer_dir: PathBuf,
    /// Entry script of the fuzz tool, relative to `fuzzer_dir`
    pub fuzzer_entry: PathBuf,
    /// External tools checked on `/status`
    pub tool_checks: Vec<ToolCheck>,
    pub start_time: Instant,
    /// Deadline for reading a request
    pub ipc_timeout: Duration,
}

/// Listener task for accepting connections.
pub struct Listener<C, F, P, T> {
    tcp: TcpListener,
    ctx: Arc<ListenCtx<C, F, P, T>>,
    shutdown: CancellationToken,
}

impl<C, F, P, T> Listener<C, F, P, T>
where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
{
    pub fn new(
        tcp: TcpListener,
        ctx: Arc<ListenCtx<C, F, P, T>>,
        shutdown: CancellationToken,
    ) -> Self {
        Self { tcp, ctx, shutdown }
    }

    /// Run the listener loop until shutdown, spawning tasks for each connection.
    pub async fn run(self) {
        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    debug!("listener stopping");
                    break;
                }
                result = self.tcp.accept() => {
                    match result {
                        Ok((stream, addr)) => {
                            debug!("TCP connection from {}", addr);
                            let ctx = Arc::clone(&self.ctx);
                            tokio::spawn(async move {
                                if let Err(e) = handle_connection(stream, &ctx).await {
                                    log_connection_error(e);
                                }
                            });
                        }
                        Err(e) => error!("TCP accept error: {}", e),
                    }
                }
            }
        }
    }
}

fn log_connection_error(e: ProtocolError) {
    match e {
        ProtocolError::ConnectionClosed => debug!("Client disconnected"),
        ProtocolError::Timeout => warn!("Connection timeout"),
        _ => error!("Connection error: {}", e),
    }
}

/// Handle a single client connection: one request, one response.
async fn handle_connection<C, F, P, T>(
    stream: TcpStream,
    ctx: &ListenCtx<C, F, P, T>,
) -> Result<(), ProtocolError>
where
    C: CatalogAdapter,
    F: FuzzerAdapter,
    P: PostProcessAdapter,
    T: TeardownAdapter,
{
    let (reader, mut writer) = stream.into_split();
    let mut reader = BufReader::new(reader);

    let response = match protocol::read_request(&mut reader, ctx.ipc_timeout).await {
        Ok(request) => {
            debug!(method = %request.method, path = %request.path, "request");
            handle_request(ctx, &request).await
        }
        Err(ProtocolError::Malformed(reason)) => {
            debug!(reason = %reason, "malformed request");
            HttpResponse::json(400, &ErrorBody::new("bad_request", reason))
        }
        Err(ProtocolError::TooLarge) => {
            HttpResponse::json(413, &ErrorBody::new("too_large", "request too large"))
        }
        Err(ProtocolError::Timeout) => {
            let _ = protocol::write_response(
                &mut writer,
                &HttpResponse::json(408, &ErrorBody::new("timeout", "timed out reading request")),
            )
            .await;
            return Err(ProtocolError::Timeout);
        }
        Err(e) => return Err(e),
    };

    protocol::write_response(&mut writer, &response).await?;
    writer.shutdown().await?;
    Ok(())
}

#[cfg(test)]
mod test_fixtures;

#[cfg(test)]
#[path = "mod_tests.rs"]
mod tests;
