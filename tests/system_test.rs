//! End-to-end tests for the comment API over real TCP connections.

use std::time::Duration;

use serde_json::{json, Value};

use resource_dispatch::config::ServiceConfig;

mod common;

#[tokio::test]
async fn test_read_comment() {
    let server = common::start_demo(ServiceConfig::default()).await;
    let client = common::client();

    let res = client.get(server.url("/api/v1/comment/7")).send().await.unwrap();
    assert_eq!(res.status(), 200);
    assert_eq!(
        res.headers()["content-type"].to_str().unwrap(),
        "application/json; charset=utf-8"
    );
    assert!(res.headers().contains_key("x-request-id"));
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "key": 7 }));
}

#[tokio::test]
async fn test_read_comment_with_bad_key() {
    let server = common::start_demo(ServiceConfig::default()).await;

    let res = common::client()
        .get(server.url("/api/v1/comment/seven"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 400);
}

#[tokio::test]
async fn test_create_comment() {
    let server = common::start_demo(ServiceConfig::default()).await;

    let res = common::client()
        .put(server.url("/api/v1/comment"))
        .body("hello")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 201);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Created" }));
}

#[tokio::test]
async fn test_unknown_path_is_not_found() {
    let server = common::start_demo(ServiceConfig::default()).await;

    let res = common::client()
        .put(server.url("/api/v1/not-found"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body, json!({ "message": "Not Found" }));
}

#[tokio::test]
async fn test_prefix_resource_is_not_routable() {
    let server = common::start_demo(ServiceConfig::default()).await;

    let res = common::client().get(server.url("/api/v1")).send().await.unwrap();
    assert_eq!(res.status(), 404);
}

#[tokio::test]
async fn test_wrong_method_is_not_allowed() {
    let server = common::start_demo(ServiceConfig::default()).await;

    let res = common::client()
        .put(server.url("/api/v1/comment/7"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 405);
    assert_eq!(res.headers()["allow"].to_str().unwrap(), "GET");
}

#[tokio::test]
async fn test_collapsed_method_not_allowed() {
    let mut config = ServiceConfig::default();
    config.dispatcher.collapse_method_not_allowed = true;
    let server = common::start_demo(config).await;

    let res = common::client()
        .put(server.url("/api/v1/comment/7"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 404);
    assert!(!res.headers().contains_key("allow"));
}

#[tokio::test]
async fn test_request_id_is_echoed() {
    let server = common::start_demo(ServiceConfig::default()).await;

    let res = common::client()
        .get(server.url("/api/v1/comment/1"))
        .header("x-request-id", "trace-abc")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"].to_str().unwrap(), "trace-abc");
}

#[tokio::test]
async fn test_bearer_token_gate() {
    let mut config = ServiceConfig::default();
    config.auth.bearer_token = Some("letmein".into());
    let server = common::start_demo(config).await;
    let client = common::client();

    let res = client.get(server.url("/api/v1/comment/1")).send().await.unwrap();
    assert_eq!(res.status(), 401);
    assert_eq!(res.headers()["www-authenticate"].to_str().unwrap(), "Bearer");

    let res = client
        .get(server.url("/api/v1/comment/1"))
        .bearer_auth("letmein")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn test_graceful_shutdown_stops_accepting() {
    let server = common::start_demo(ServiceConfig::default()).await;
    let client = common::client();

    let res = client.get(server.url("/api/v1/comment/1")).send().await.unwrap();
    assert_eq!(res.status(), 200);

    server.shutdown.trigger();
    tokio::time::sleep(Duration::from_millis(200)).await;

    let result = client
        .get(server.url("/api/v1/comment/1"))
        .timeout(Duration::from_secs(2))
        .send()
        .await;
    assert!(result.is_err(), "server should refuse connections after shutdown");
}
