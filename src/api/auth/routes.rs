use axum::{routing::post, Router};
use crate::config::state::AppState;
use super::handler;

/// Public auth endpoints (logout is mounted on the protected router)
pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(handler::register))
        .route("/auth/login", post(handler::login))
}

pub fn logout_route() -> Router<AppState> {
    Router::new()
        .route("/auth/logout", post(handler::logout))
}
