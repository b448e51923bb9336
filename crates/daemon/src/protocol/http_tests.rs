// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use tokio::io::BufReader;
use yare::parameterized;

const TIMEOUT: Duration = Duration::from_secs(1);

async fn parse(raw: &[u8]) -> Result<HttpRequest, ProtocolError> {
    let mut reader = BufReader::new(raw);
    read_request(&mut reader, TIMEOUT).await
}

#[tokio::test]
async fn reads_simple_get() {
    let request = parse(b"GET /fuzz_plugin/state HTTP/1.1\r\nHost: localhost\r\n\r\n").await.unwrap();
    assert_eq!(request.method, "GET");
    assert_eq!(request.path, "/fuzz_plugin/state");
    assert!(request.body.is_empty());
}

#[tokio::test]
async fn strips_query_string() {
    let request = parse(b"GET /fuzz_plugin/history?page=2 HTTP/1.1\r\n\r\n").await.unwrap();
    assert_eq!(request.path, "/fuzz_plugin/history");
}

#[tokio::test]
async fn reads_body_by_content_length() {
    let request =
        parse(b"POST /fuzz_plugin/akismet HTTP/1.1\r\ncontent-length: 2\r\n\r\n{}trailing")
            .await
            .unwrap();
    assert_eq!(request.method, "POST");
    assert_eq!(request.body, b"{}");
}

#[tokio::test]
async fn accepts_bare_newlines() {
    let request = parse(b"GET /status HTTP/1.0\nHost: x\n\n").await.unwrap();
    assert_eq!(request.path, "/status");
}

#[parameterized(
    missing_version = { b"GET /status\r\n\r\n" },
    extra_token = { b"GET /status HTTP/1.1 extra\r\n\r\n" },
    wrong_protocol = { b"GET /status SPDY/3\r\n\r\n" },
    relative_target = { b"GET status HTTP/1.1\r\n\r\n" },
    bad_header = { b"GET /status HTTP/1.1\r\nno-colon-here\r\n\r\n" },
    bad_length = { b"POST /fuzz_plugin/a HTTP/1.1\r\nContent-Length: ten\r\n\r\n" },
    truncated_head = { b"GET /status HTTP/1.1\r\nHost: x\r\n" },
)]
#[test_macro(tokio::test)]
async fn rejects_malformed_requests(raw: &[u8]) {
    let err = parse(raw).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Malformed(_)), "got {err:?}");
}

#[tokio::test]
async fn empty_stream_is_connection_closed() {
    let err = parse(b"").await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed), "got {err:?}");
}

#[tokio::test]
async fn short_body_is_connection_closed() {
    let err = parse(b"POST /fuzz_plugin/a HTTP/1.1\r\nContent-Length: 10\r\n\r\nabc").await.unwrap_err();
    assert!(matches!(err, ProtocolError::ConnectionClosed), "got {err:?}");
}

#[tokio::test]
async fn oversized_head_is_rejected() {
    let mut raw = b"GET /status HTTP/1.1\r\nX-Filler: ".to_vec();
    raw.extend(std::iter::repeat(b'a').take(MAX_HEAD_BYTES));
    raw.extend_from_slice(b"\r\n\r\n");
    let err = parse(&raw).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TooLarge), "got {err:?}");
}

#[tokio::test]
async fn oversized_body_is_rejected() {
    let raw = format!("POST /fuzz_plugin/a HTTP/1.1\r\nContent-Length: {}\r\n\r\n", MAX_BODY_BYTES + 1);
    let err = parse(raw.as_bytes()).await.unwrap_err();
    assert!(matches!(err, ProtocolError::TooLarge), "got {err:?}");
}

#[tokio::test]
async fn stalled_client_times_out() {
    let (client, server) = tokio::io::duplex(64);
    let mut reader = BufReader::new(server);
    let err = read_request(&mut reader, Duration::from_millis(20)).await.unwrap_err();
    assert!(matches!(err, ProtocolError::Timeout), "got {err:?}");
    drop(client);
}

#[tokio::test]
async fn response_head_carries_length_and_close() {
    let response = HttpResponse::json(409, &ErrorBodyLike { error: "conflict" });
    let mut wire = Vec::new();
    write_response(&mut wire, &response).await.unwrap();

    let text = String::from_utf8(wire).unwrap();
    assert!(text.starts_with("HTTP/1.1 409 Conflict\r\n"), "got {text}");
    assert!(text.contains("Content-Type: application/json\r\n"), "got {text}");
    assert!(text.contains("Content-Length: 20\r\n"), "got {text}");
    assert!(text.contains("Connection: close\r\n"), "got {text}");
    assert!(text.ends_with("\r\n\r\n{\"error\":\"conflict\"}"), "got {text}");
}

#[derive(serde::Serialize)]
struct ErrorBodyLike {
    error: &'static str,
}

#[parameterized(
    ok = { 200, "OK" },
    accepted = { 202, "Accepted" },
    forbidden = { 403, "Forbidden" },
    bad_gateway = { 502, "Bad Gateway" },
    unknown = { 599, "Unknown" },
)]
fn reason_phrases(status: u16, expected: &str) {
    assert_eq!(reason_phrase(status), expected);
}
