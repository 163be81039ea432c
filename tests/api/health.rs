//! tests/api/health.rs
//! Smoke test for the /health endpoint and the response envelope.

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::Value;

#[tokio::test]
async fn health_returns_ok_with_service_identity() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/health", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_eq!(resp.status(), StatusCode::OK);

    let body: String = resp.text().await.unwrap();
    let json: Value = serde_json::from_str(&body).unwrap();

    // Envelope fields
    assert_eq!(json["status"], "OK");
    assert_eq!(json["code"], 200);
    assert!(json["date"].is_string());

    // Payload fields
    assert_eq!(json["data"]["service"], "mediacrawler");
    assert!(json["data"]["version"].is_string());
}
