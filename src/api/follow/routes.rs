use axum::{
    routing::{get, post},
    Router,
};

use crate::config::state::AppState;
use super::handler;

pub fn follow_routes() -> Router<AppState> {
    Router::new()
        .route("/follow", post(handler::toggle_follow_handler))
        .route("/user/following", get(handler::list_following_handler))
}
