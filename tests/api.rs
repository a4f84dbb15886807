use std::net::SocketAddr;

use moneybags::config::{MoneybagsPaths, Settings};
use moneybags::storage::Storage;
use moneybags::web::{router, AppState};
use serde_json::Value;
use tempfile::TempDir;
use tokio::io::{AsyncReadExt, AsyncWriteExt};

async fn start_server() -> (TempDir, SocketAddr) {
    let dir = TempDir::new().expect("tempdir");
    let paths = MoneybagsPaths::with_base_dir(dir.path().to_path_buf());
    let storage = Storage::in_memory().await.expect("storage");
    let app = router(AppState::new(storage, Settings::default(), paths));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind listener");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move { axum::serve(listener, app).await.expect("serve app") });
    (dir, addr)
}

async fn send_raw(
    addr: SocketAddr,
    method: &str,
    path: &str,
    json_body: Option<&str>,
) -> (u16, String, Value) {
    let mut stream = tokio::net::TcpStream::connect(addr)
        .await
        .expect("connect server");
    let mut req = format!("{method} {path} HTTP/1.1\r\nHost: {addr}\r\nConnection: close\r\n");
    if let Some(body) = json_body {
        req.push_str("Content-Type: application/json\r\n");
        req.push_str(&format!("Content-Length: {}\r\n\r\n{}", body.len(), body));
    } else {
        req.push_str("Content-Length: 0\r\n\r\n");
    }
    stream
        .write_all(req.as_bytes())
        .await
        .expect("write request");

    let mut response = String::new();
    stream
        .read_to_string(&mut response)
        .await
        .expect("read response");
    let (head, body) = response
        .split_once("\r\n\r\n")
        .expect("http response must have separator");
    let status = head
        .lines()
        .next()
        .and_then(|line| line.split_whitespace().nth(1))
        .and_then(|s| s.parse::<u16>().ok())
        .expect("http status");
    let json: Value = serde_json::from_str(body).expect("json body");
    (status, head.to_lowercase(), json)
}

fn assert_validation_envelope(status: u16, head: &str, json: &Value) {
    assert_eq!(status, 400, "{json}");
    assert!(head.contains("content-type: application/json"), "{head}");
    assert_eq!(json["success"], false);
    assert_eq!(json["retryable"], false);
    assert!(json["error"].as_str().is_some_and(|e| !e.is_empty()));
}

#[tokio::test]
async fn missing_body_field_is_a_validation_error() {
    let (_dir, addr) = start_server().await;
    let (status, head, json) = send_raw(
        addr,
        "POST",
        "/api/budget-entries",
        Some(r#"{"year":2024,"month":1,"amount":5}"#),
    )
    .await;
    assert_validation_envelope(status, &head, &json);
    assert!(json["error"].as_str().unwrap().contains("category_id"));
}

#[tokio::test]
async fn malformed_json_is_a_validation_error() {
    let (_dir, addr) = start_server().await;
    let (status, head, json) = send_raw(addr, "POST", "/api/categories", Some(r#"{"name":"#)).await;
    assert_validation_envelope(status, &head, &json);
}

#[tokio::test]
async fn body_without_json_content_type_is_a_validation_error() {
    let (_dir, addr) = start_server().await;
    let (status, head, json) = send_raw(addr, "POST", "/api/categories", None).await;
    assert_validation_envelope(status, &head, &json);
}

#[tokio::test]
async fn bad_path_id_is_a_validation_error() {
    let (_dir, addr) = start_server().await;
    let (status, head, json) = send_raw(addr, "DELETE", "/api/transactions/not-a-uuid", None).await;
    assert_validation_envelope(status, &head, &json);
}

#[tokio::test]
async fn bad_query_is_a_validation_error() {
    let (_dir, addr) = start_server().await;
    let (status, head, json) = send_raw(addr, "GET", "/api/transactions?year=abc", None).await;
    assert_validation_envelope(status, &head, &json);
}

#[tokio::test]
async fn well_formed_request_succeeds() {
    let (_dir, addr) = start_server().await;
    let (status, _, json) = send_raw(
        addr,
        "POST",
        "/api/categories",
        Some(r#"{"name":"Food","type":"expenses"}"#),
    )
    .await;
    assert_eq!(status, 201, "{json}");
    assert_eq!(json["success"], true);
    assert_eq!(json["data"]["name"], "Food");

    let (status, _, json) = send_raw(addr, "GET", "/api/categories", None).await;
    assert_eq!(status, 200);
    assert_eq!(json["data"].as_array().map(Vec::len), Some(1));
}

#[tokio::test]
async fn supersaver_routes_round_trip() {
    let (_dir, addr) = start_server().await;
    let (status, _, json) = send_raw(
        addr,
        "POST",
        "/api/supersaver/categories",
        Some(r#"{"name":"Holiday"}"#),
    )
    .await;
    assert_eq!(status, 201, "{json}");
    let category_id = json["data"]["id"].as_str().expect("category id").to_string();

    let body = format!(r#"{{"category_id":"{category_id}","date":"2024-07-01","amount":2500}}"#);
    let (status, _, json) = send_raw(addr, "POST", "/api/supersaver/entries", Some(&body)).await;
    assert_eq!(status, 201, "{json}");
    assert_eq!(json["data"]["category_name"], "Holiday");

    let (status, _, json) = send_raw(
        addr,
        "GET",
        &format!("/api/supersaver/categories/{category_id}/entries/2024/7"),
        None,
    )
    .await;
    assert_eq!(status, 200, "{json}");
    assert_eq!(json["data"].as_array().map(Vec::len), Some(1));

    let (status, _, json) = send_raw(addr, "GET", "/api/supersaver/heatmap/2024", None).await;
    assert_eq!(status, 200, "{json}");
    assert_eq!(json["data"]["days"]["2024-07-01"], 2500);
    assert_eq!(json["data"]["total_saved"], 2500);

    let (status, _, json) = send_raw(
        addr,
        "DELETE",
        &format!("/api/supersaver/categories/{category_id}"),
        None,
    )
    .await;
    assert_eq!(status, 409, "{json}");
    assert_eq!(json["success"], false);

    let (status, _, json) = send_raw(addr, "GET", "/api/supersaver/summary", None).await;
    assert_eq!(status, 200, "{json}");
    assert!(json["data"]["month_trend"].is_string());
}
