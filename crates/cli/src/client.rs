// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! HTTP client for the `wfd` API.

use std::net::SocketAddr;
use std::time::Duration;

use reqwest::Method;
use serde::de::DeserializeOwned;
use thiserror::Error;
use wf_core::{PluginSlug, RunState};
use wf_daemon::protocol::{self, ErrorBody, HistoryBody};
use wf_daemon::{StartedBody, StatusReport};

/// Covers a start request, which waits on the plugin catalog lookup
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

#[derive(Debug, Error)]
pub enum ClientError {
    #[error("daemon not reachable at {addr}: {source}")]
    Unreachable {
        addr: SocketAddr,
        #[source]
        source: reqwest::Error,
    },

    #[error("timed out waiting for daemon at {0}")]
    Timeout(SocketAddr),

    #[error("request to daemon failed: {0}")]
    Http(#[source] reqwest::Error),

    /// The daemon answered with an error body
    #[error("{message}")]
    Rejected { status: u16, kind: String, message: String },

    #[error("unexpected response ({status}): {detail}")]
    UnexpectedResponse { status: u16, detail: String },
}

impl ClientError {
    pub fn is_unreachable(&self) -> bool {
        matches!(self, ClientError::Unreachable { .. } | ClientError::Timeout(_))
    }
}

/// Status and body of a daemon reply, read in full
struct Reply {
    status: u16,
    body: Vec<u8>,
}

#[derive(Debug, Clone)]
pub struct DaemonClient {
    client: reqwest::Client,
    addr: SocketAddr,
    base_url: String,
    timeout: Duration,
}

impl DaemonClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            client: reqwest::Client::new(),
            addr,
            base_url: format!("http://{}", addr),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Client for the address the daemon binds by default
    /// (`WF_BIND_ADDR`/`WF_HTTP_PORT`)
    pub fn from_env() -> Self {
        Self::new(wf_daemon::env::daemon_addr())
    }

    /// Bound on each whole request, connect through last body byte
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Start a fuzz run for `target`
    pub async fn start(&self, target: &str) -> Result<StartedBody, ClientError> {
        let reply = self.send(Method::POST, &protocol::fuzz_path(target)).await?;
        Self::decode(reply)
    }

    pub async fn state(&self) -> Result<RunState, ClientError> {
        let reply = self.send(Method::GET, protocol::STATE_PATH).await?;
        Self::decode(reply)
    }

    pub async fn history(&self) -> Result<Vec<PluginSlug>, ClientError> {
        let reply = self.send(Method::GET, protocol::HISTORY_PATH).await?;
        Self::decode::<HistoryBody>(reply).map(|body| body.data)
    }

    /// Archived artifact for `target`, as stored
    pub async fn result(&self, target: &str) -> Result<serde_json::Value, ClientError> {
        let reply = self.send(Method::GET, &protocol::results_path(target)).await?;
        Self::decode(reply)
    }

    pub async fn status(&self) -> Result<StatusReport, ClientError> {
        let reply = self.send(Method::GET, protocol::STATUS_PATH).await?;
        Self::decode(reply)
    }

    /// Send one body-less request and read the whole response
    async fn send(&self, method: Method, path: &str) -> Result<Reply, ClientError> {
        let response = self
            .client
            .request(method, format!("{}{}", self.base_url, path))
            .header(reqwest::header::ACCEPT, "application/json")
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| self.classify(e))?;
        let status = response.status().as_u16();
        let body = response.bytes().await.map_err(|e| self.classify(e))?;
        Ok(Reply { status, body: body.to_vec() })
    }

    fn classify(&self, e: reqwest::Error) -> ClientError {
        if e.is_timeout() {
            ClientError::Timeout(self.addr)
        } else if e.is_connect() {
            ClientError::Unreachable { addr: self.addr, source: e }
        } else {
            ClientError::Http(e)
        }
    }

    fn decode<T: DeserializeOwned>(reply: Reply) -> Result<T, ClientError> {
        if !(200..300).contains(&reply.status) {
            return Self::reject(reply);
        }
        serde_json::from_slice(&reply.body).map_err(|e| ClientError::UnexpectedResponse {
            status: reply.status,
            detail: e.to_string(),
        })
    }

    fn reject<T>(reply: Reply) -> Result<T, ClientError> {
        match serde_json::from_slice::<ErrorBody>(&reply.body) {
            Ok(body) => Err(ClientError::Rejected {
                status: reply.status,
                kind: body.error,
                message: body.message,
            }),
            Err(_) => Err(ClientError::UnexpectedResponse {
                status: reply.status,
                detail: String::from_utf8_lossy(&reply.body).into_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "client_tests.rs"]
mod tests;
