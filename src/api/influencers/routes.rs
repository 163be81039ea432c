use axum::{
    routing::{get, post},
    Router,
};

use crate::config::state::AppState;
use super::handler;

pub fn influencer_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/influencers",
            get(handler::list_influencers_handler).post(handler::create_influencer_handler),
        )
        .route("/influencers/{influencer_id}/videos", get(handler::list_videos_handler))
}
