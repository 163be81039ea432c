// Health endpoint for load balancers and smoke tests

use serde_json::json;
use axum::{extract::State, http::StatusCode};

use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;
use tracing::info;

pub async fn health_handler(State(state): State<AppState>) -> HandlerResponse {
    info!("Health endpoint called");

    HandlerResponse::new(StatusCode::OK)
        .data(json!({
            "service": "mediacrawler",
            "version": env!("CARGO_PKG_VERSION"),
            "environment": state.environment.environment,
        }))
        .message("Service is healthy")
}
