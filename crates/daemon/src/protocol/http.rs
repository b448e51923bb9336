// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Minimal HTTP/1.1 framing for the daemon API.
//!
//! Server side only: requests are read using `Content-Length` framing and
//! responses always carry one. Heads and request bodies are size-capped so a
//! misbehaving client cannot make the daemon buffer without bound.

use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::Serialize;
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Upper bound on request line plus headers
pub const MAX_HEAD_BYTES: usize = 16 * 1024;

/// Upper bound on a request body. API requests carry no body, so this is small.
pub const MAX_BODY_BYTES: usize = 64 * 1024;

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("connection closed")]
    ConnectionClosed,

    #[error("timed out reading request")]
    Timeout,

    #[error("malformed message: {0}")]
    Malformed(String),

    #[error("message too large")]
    TooLarge,

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: String,
    /// Request target without the query string
    pub path: String,
    pub body: Vec<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// JSON response with the given status
    pub fn json<T: Serialize + ?Sized>(status: u16, value: &T) -> Self {
        match serde_json::to_vec(value) {
            Ok(body) => Self { status, body },
            Err(e) => {
                tracing::error!(error = %e, "failed to serialize response body");
                Self {
                    status: 500,
                    body: br#"{"error":"internal","message":"failed to serialize response"}"#
                        .to_vec(),
                }
            }
        }
    }

    pub fn parse<T: DeserializeOwned>(&self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.body)
    }
}

pub fn reason_phrase(status: u16) -> &'static str {
    match status {
        200 => "OK",
        202 => "Accepted",
        400 => "Bad Request",
        403 => "Forbidden",
        404 => "Not Found",
        405 => "Method Not Allowed",
        408 => "Request Timeout",
        409 => "Conflict",
        413 => "Payload Too Large",
        500 => "Internal Server Error",
        502 => "Bad Gateway",
        _ => "Unknown",
    }
}

/// Read one request, bounded by `timeout` for the whole head and body
pub async fn read_request<R>(reader: &mut R, timeout: Duration) -> Result<HttpRequest, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    tokio::time::timeout(timeout, read_request_inner(reader))
        .await
        .map_err(|_| ProtocolError::Timeout)?
}

async fn read_request_inner<R>(reader: &mut R) -> Result<HttpRequest, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let head = read_head(reader).await?;
    let Some((request_line, headers)) = head.split_first() else {
        return Err(ProtocolError::ConnectionClosed);
    };

    let mut parts = request_line.split_whitespace();
    let (Some(method), Some(target), Some(version), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return Err(ProtocolError::Malformed(format!("bad request line: {}", request_line)));
    };
    if !version.starts_with("HTTP/1.") {
        return Err(ProtocolError::Malformed(format!("unsupported version: {}", version)));
    }
    if !target.starts_with('/') {
        return Err(ProtocolError::Malformed(format!("bad request target: {}", target)));
    }
    let path = target.split_once('?').map_or(target, |(path, _)| path);

    let length = content_length(headers)?.unwrap_or(0);
    if length > MAX_BODY_BYTES {
        return Err(ProtocolError::TooLarge);
    }
    let mut body = vec![0u8; length];
    reader.read_exact(&mut body).await.map_err(eof_as_closed)?;

    Ok(HttpRequest { method: method.to_string(), path: path.to_string(), body })
}

/// Write a complete JSON response and flush it
pub async fn write_response<W>(writer: &mut W, response: &HttpResponse) -> std::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    let head = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n",
        response.status,
        reason_phrase(response.status),
        response.body.len()
    );
    writer.write_all(head.as_bytes()).await?;
    writer.write_all(&response.body).await?;
    writer.flush().await
}

/// Read lines up to the blank line ending the head. Leading blank lines are
/// skipped.
async fn read_head<R>(reader: &mut R) -> Result<Vec<String>, ProtocolError>
where
    R: AsyncBufRead + Unpin,
{
    let mut lines = Vec::new();
    let mut total = 0usize;
    loop {
        if total >= MAX_HEAD_BYTES {
            return Err(ProtocolError::TooLarge);
        }
        let budget = (MAX_HEAD_BYTES - total) as u64;
        let mut line = String::new();
        let n = (&mut *reader).take(budget).read_line(&mut line).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::InvalidData {
                ProtocolError::Malformed("head is not valid UTF-8".to_string())
            } else {
                ProtocolError::Io(e)
            }
        })?;
        if n == 0 {
            return if lines.is_empty() {
                Err(ProtocolError::ConnectionClosed)
            } else {
                Err(ProtocolError::Malformed("unexpected end of head".to_string()))
            };
        }
        total += n;
        if !line.ends_with('\n') && total >= MAX_HEAD_BYTES {
            return Err(ProtocolError::TooLarge);
        }

        let line = line.trim_end_matches(['\r', '\n']);
        if line.is_empty() {
            if lines.is_empty() {
                continue;
            }
            return Ok(lines);
        }
        lines.push(line.to_string());
    }
}

fn content_length(headers: &[String]) -> Result<Option<usize>, ProtocolError> {
    for header in headers {
        let Some((name, value)) = header.split_once(':') else {
            return Err(ProtocolError::Malformed(format!("bad header: {}", header)));
        };
        if name.trim().eq_ignore_ascii_case("content-length") {
            return value
                .trim()
                .parse::<usize>()
                .map(Some)
                .map_err(|_| ProtocolError::Malformed(format!("bad content-length: {}", value)));
        }
    }
    Ok(None)
}

fn eof_as_closed(e: std::io::Error) -> ProtocolError {
    if e.kind() == std::io::ErrorKind::UnexpectedEof {
        ProtocolError::ConnectionClosed
    } else {
        ProtocolError::Io(e)
    }
}

#[cfg(test)]
#[path = "http_tests.rs"]
mod tests;
