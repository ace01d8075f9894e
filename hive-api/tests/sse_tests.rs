//! Live status stream tests: SSE headers, result ingestion fan-out,
//! heartbeats and subscriber cleanup.

#[path = "support/app.rs"]
mod app;

use std::time::Duration;

use app::{request, send, test_app, test_app_with};
use axum::{body::Body, http::StatusCode};
use futures_util::StreamExt;
use hive_api::packages::Socket;
use hive_events::{spawn_heartbeat, DispatcherConfig};
use hive_test_utils::TEST_ROOT_TOKEN;
use serde_json::json;
use tower::ServiceExt;

const ROOT: Option<&str> = Some(TEST_ROOT_TOKEN);

fn socket(id: &str, healthy: bool) -> Socket {
    Socket {
        id: id.to_string(),
        name: id.to_string(),
        host: "10.0.0.1".to_string(),
        port: 443,
        expected_status: None,
        healthy,
        last_checked: None,
    }
}

/// Read body chunks until `needle` shows up or the timeout passes.
async fn read_until(body: Body, needle: &str) -> String {
    let mut stream = body.into_data_stream();
    let mut seen = String::new();
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);

    while !seen.contains(needle) {
        let next = tokio::time::timeout_at(deadline, stream.next()).await;
        match next {
            Ok(Some(Ok(chunk))) => seen.push_str(&String::from_utf8_lossy(&chunk)),
            _ => break,
        }
    }
    seen
}

#[tokio::test]
async fn test_status_stream_headers() {
    let (router, _state) = test_app();
    let response = router
        .clone()
        .oneshot(request("GET", "/dish/sockets/status", ROOT, None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers();
    assert_eq!(headers["content-type"], "text/event-stream");
    assert_eq!(headers["cache-control"], "no-cache");
    assert_eq!(headers["connection"], "keep-alive");
}

#[tokio::test]
async fn test_status_stream_requires_token() {
    let (router, _state) = test_app();
    let (status, _) = send(&router, request("GET", "/dish/sockets/status", None, None)).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_results_are_streamed_to_subscribers() {
    let (router, state) = test_app();
    let sockets = state.dish.sockets();
    sockets.set("s1", socket("s1", true));
    sockets.set("s2", socket("s2", true));

    let first = router
        .clone()
        .oneshot(request("GET", "/dish/sockets/status", ROOT, None))
        .await
        .unwrap();
    let second = router
        .clone()
        .oneshot(request("GET", "/dish/sockets/status", ROOT, None))
        .await
        .unwrap();

    let results = json!({"results": {"s1": false, "s2": true, "ghost": true}});
    let (status, body) = send(&router, request("POST", "/dish/sockets/results", ROOT, Some(results))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["changed"], json!(["s1"]));
    assert_eq!(body["updated"], 2);
    assert_eq!(body["unknown"], 1);

    for response in [first, second] {
        let seen = read_until(response.into_body(), "sockets changed").await;
        assert!(seen.contains("event: message"), "got: {}", seen);
        assert!(seen.contains("\"keys\":[\"s1\"]"), "got: {}", seen);
    }
}

#[tokio::test]
async fn test_late_subscriber_misses_earlier_message() {
    let (router, state) = test_app();
    state.dish.sockets().set("s1", socket("s1", true));
    state.dish.sockets().set("s2", socket("s2", true));

    let results = json!({"results": {"s1": false}});
    send(&router, request("POST", "/dish/sockets/results", ROOT, Some(results))).await;
    state.dispatcher.barrier().await;

    let late = router
        .clone()
        .oneshot(request("GET", "/dish/sockets/status", ROOT, None))
        .await
        .unwrap();

    let results = json!({"results": {"s2": false}});
    send(&router, request("POST", "/dish/sockets/results", ROOT, Some(results))).await;

    let seen = read_until(late.into_body(), "sockets changed").await;
    assert!(seen.contains("\"keys\":[\"s2\"]"), "got: {}", seen);
    assert!(!seen.contains("\"keys\":[\"s1\"]"), "got: {}", seen);
}

#[tokio::test]
async fn test_heartbeat_reaches_stream() {
    let (router, state) = test_app_with(DispatcherConfig {
        heartbeat_interval: Duration::from_millis(50),
        ..DispatcherConfig::default()
    });
    let heartbeat = spawn_heartbeat(state.dispatcher.clone());

    let response = router
        .clone()
        .oneshot(request("GET", "/dish/sockets/status", ROOT, None))
        .await
        .unwrap();

    let seen = read_until(response.into_body(), "event: heartbeat").await;
    assert!(seen.contains("event: heartbeat"), "got: {}", seen);
    heartbeat.abort();
}

#[tokio::test]
async fn test_dropped_stream_deregisters() {
    let (router, state) = test_app();
    let response = router
        .clone()
        .oneshot(request("GET", "/dish/sockets/status", ROOT, None))
        .await
        .unwrap();

    state.dispatcher.barrier().await;
    assert_eq!(state.dispatcher.stats().subscribers, 1);

    drop(response);
    state.dispatcher.barrier().await;
    assert_eq!(state.dispatcher.stats().subscribers, 0);
}

#[tokio::test]
async fn test_socket_crud_is_nested() {
    let (router, _state) = test_app();
    let body = json!({"id": "s1", "host": "10.0.0.1", "port": 22});

    let (status, created) = send(&router, request("POST", "/dish/sockets/s1", ROOT, Some(body))).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["healthy"], false);

    let (status, listed) = send(&router, request("GET", "/dish/sockets", ROOT, None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(listed["count"], 1);
}
