//! tests/global_errors/404.rs
//! Unknown routes must come back as a 404 wrapped in the standard envelope.

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn unknown_route_returns_enveloped_404() {
    let base_url: String = common::spawn_app();

    // No handler is mounted anywhere near this path.
    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/crawl/does-not-exist", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    // Even a bare fallback 404 goes through the response wrapper,
    // so the full envelope must be present.
    let body: String = resp.text().await.unwrap();
    let json: Value = serde_json::from_str(&body).unwrap();

    assert_eq!(json["status"], "NOT_FOUND");
    assert_eq!(json["code"], 404);
    assert!(json["data"].is_null());
    assert_eq!(json["messages"], Value::Array(vec![]));
    assert!(json["date"].is_string());
}
