//! tests/api/auth_gating.rs
//! Protected routes must reject requests without a Bearer token.

#[path = "../mod.rs"]
mod common;

use reqwest::StatusCode;
use serde_json::{json, Value};

async fn assert_unauthorized(resp: reqwest::Response) {
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let body: String = resp.text().await.unwrap();
    let json: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(json["code"], 401);
    assert_eq!(json["messages"][0], "Not authorized, no token");
}

#[tokio::test]
async fn influencers_list_requires_token() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/influencers", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_unauthorized(resp).await;
}

#[tokio::test]
async fn following_feed_requires_token() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/user/following", base_url))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_unauthorized(resp).await;
}

#[tokio::test]
async fn follow_toggle_requires_token() {
    let base_url: String = common::spawn_app();

    let resp: reqwest::Response = reqwest::Client::new()
        .post(format!("{}/follow", base_url))
        .json(&json!({ "influencer_id": "00000000-0000-0000-0000-000000000000" }))
        .send()
        .await
        .expect("Failed to execute request.");

    assert_unauthorized(resp).await;
}

#[tokio::test]
async fn malformed_authorization_header_is_rejected() {
    let base_url: String = common::spawn_app();

    // A token without the Bearer prefix counts as no token at all.
    let resp: reqwest::Response = reqwest::Client::new()
        .get(format!("{}/influencers", base_url))
        .header("authorization", "some-raw-token")
        .send()
        .await
        .expect("Failed to execute request.");

    assert_unauthorized(resp).await;
}
