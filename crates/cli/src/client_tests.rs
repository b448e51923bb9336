// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serial_test::serial;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::TcpListener;
use wf_daemon::protocol::{write_response, HttpResponse};

/// Serve a single canned response and return the request path it received
async fn serve_once(response: HttpResponse) -> (SocketAddr, tokio::task::JoinHandle<String>) {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let task = tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = stream.into_split();
        let request = protocol::read_request(&mut BufReader::new(reader), Duration::from_secs(5))
            .await
            .unwrap();
        write_response(&mut writer, &response).await.unwrap();
        format!("{} {}", request.method, request.path)
    });
    (addr, task)
}

#[tokio::test]
async fn start_posts_to_plugin_path() {
    let body = StartedBody {
        message: "Fuzzer started with plugin akismet".into(),
        run_id: "run-1".into(),
        target: PluginSlug::parse("akismet").unwrap(),
    };
    let (addr, server) = serve_once(HttpResponse::json(202, &body)).await;

    let started = DaemonClient::new(addr).start("akismet").await.unwrap();

    assert_eq!(started, body);
    assert_eq!(server.await.unwrap(), "POST /fuzz_plugin/akismet");
}

#[tokio::test]
async fn state_parses_bare_string() {
    let (addr, server) = serve_once(HttpResponse::json(200, &RunState::Fuzzing)).await;
    assert_eq!(DaemonClient::new(addr).state().await.unwrap(), RunState::Fuzzing);
    assert_eq!(server.await.unwrap(), "GET /fuzz_plugin/state");
}

#[tokio::test]
async fn history_unwraps_data() {
    let body = HistoryBody { data: vec![PluginSlug::parse("akismet").unwrap()] };
    let (addr, _server) = serve_once(HttpResponse::json(200, &body)).await;
    let history = DaemonClient::new(addr).history().await.unwrap();
    assert_eq!(history, body.data);
}

#[tokio::test]
async fn error_body_becomes_rejection() {
    let body = ErrorBody::new("conflict", "a fuzz run is already in progress for 'jetpack'");
    let (addr, _server) = serve_once(HttpResponse::json(409, &body)).await;

    let err = DaemonClient::new(addr).start("akismet").await.unwrap_err();

    match err {
        ClientError::Rejected { status, kind, message } => {
            assert_eq!(status, 409);
            assert_eq!(kind, "conflict");
            assert!(message.contains("jetpack"));
        }
        other => panic!("expected rejection, got {other:?}"),
    }
}

#[tokio::test]
async fn non_json_error_is_unexpected() {
    let response = HttpResponse { status: 500, body: b"oops".to_vec() };
    let (addr, _server) = serve_once(response).await;
    let err = DaemonClient::new(addr).status().await.unwrap_err();
    assert!(matches!(err, ClientError::UnexpectedResponse { status: 500, .. }), "got {err:?}");
}

/// Answer a single request with `raw` bytes, exactly as given
async fn serve_raw(raw: &'static [u8]) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let (stream, _) = listener.accept().await.unwrap();
        let (reader, mut writer) = stream.into_split();
        protocol::read_request(&mut BufReader::new(reader), Duration::from_secs(5)).await.unwrap();
        writer.write_all(raw).await.unwrap();
        writer.shutdown().await.unwrap();
    });
    addr
}

#[tokio::test]
async fn chunked_body_is_decoded() {
    let addr = serve_raw(
        b"HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nTransfer-Encoding: chunked\r\n\r\n\
          4\r\n\"FUZ\r\n5\r\nZING\"\r\n0\r\n\r\n",
    )
    .await;
    assert_eq!(DaemonClient::new(addr).state().await.unwrap(), RunState::Fuzzing);
}

#[tokio::test]
async fn body_without_length_runs_to_close() {
    let addr = serve_raw(b"HTTP/1.1 200 OK\r\nConnection: close\r\n\r\n\"NOT_STARTED\"").await;
    assert_eq!(DaemonClient::new(addr).state().await.unwrap(), RunState::NotStarted);
}

#[tokio::test]
async fn closed_port_is_unreachable() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let err = DaemonClient::new(addr).state().await.unwrap_err();
    assert!(matches!(err, ClientError::Unreachable { addr: a, .. } if a == addr), "got {err:?}");
    assert!(err.is_unreachable());
}

#[tokio::test]
async fn silent_daemon_times_out() {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    let client = DaemonClient::new(addr).with_timeout(Duration::from_millis(50));
    let err = client.state().await.unwrap_err();

    assert!(matches!(err, ClientError::Timeout(a) if a == addr), "got {err:?}");
    drop(listener);
}

#[test]
#[serial]
fn from_env_uses_configured_port() {
    std::env::set_var("WF_HTTP_PORT", "8123");
    std::env::remove_var("WF_BIND_ADDR");
    let client = DaemonClient::from_env();
    std::env::remove_var("WF_HTTP_PORT");

    assert_eq!(client.addr(), "127.0.0.1:8123".parse::<SocketAddr>().unwrap());
}
