// Follow/unfollow toggle and the authenticated user's following feed

use serde::Deserialize;
use serde_json::json;
use axum::{extract::{Extension, State}, http::StatusCode, Json};
use sqlx::Row;
use uuid::Uuid;

use crate::api::middleware::CurrentUser;
use crate::api::influencers::handler::video_row_to_json;
use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;
use tracing::{error, info, instrument};

#[derive(Debug, Deserialize)]
pub struct FollowRequest {
    pub influencer_id: Option<Uuid>,
}

/// Toggles the follow relation: following an influencer you already
/// follow unfollows them, matching the original single-endpoint design
#[instrument(name = "toggle_follow", skip(state, user, request), fields(user_id = %user.user_id))]
pub async fn toggle_follow_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
    Json(request): Json<FollowRequest>,
) -> HandlerResponse {
    let influencer_id: Uuid = match request.influencer_id {
        Some(id) => id,
        None => {
            return HandlerResponse::new(StatusCode::BAD_REQUEST)
                .data(json!({ "error": "missing_influencer_id" }))
                .message("Please provide influencer ID");
        }
    };

    match toggle_follow_internal(&state, user.user_id, influencer_id).await {
        Ok(Some(followed)) => {
            info!(
                "User {} {} influencer {}",
                user.user_id,
                if followed { "followed" } else { "unfollowed" },
                influencer_id
            );
            HandlerResponse::new(StatusCode::OK)
                .data(json!({ "following": followed, "influencer_id": influencer_id }))
                .message(if followed { "Followed successfully" } else { "Unfollowed successfully" })
        }
        Ok(None) => {
            HandlerResponse::new(StatusCode::NOT_FOUND)
                .data(json!({ "error": "influencer_not_found" }))
                .message("Influencer not found")
        }
        Err(e) => {
            error!("Follow toggle failed: {}", e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .data(json!({
                    "error": "follow_toggle_failed",
                    "details": e.to_string()
                }))
                .message("Error following/unfollowing")
        }
    }
}

/// Returns Some(true) after a follow, Some(false) after an unfollow,
/// None when the influencer does not exist
async fn toggle_follow_internal(
    state: &AppState,
    user_id: Uuid,
    influencer_id: Uuid,
) -> anyhow::Result<Option<bool>> {
    let pool: sqlx::PgPool = state.database.pool().await?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM influencers WHERE id = $1)"
    )
    .bind(influencer_id)
    .fetch_one(&pool)
    .await?;

    if !exists {
        return Ok(None);
    }

    // Try the unfollow first; zero rows affected means we follow instead
    let deleted: u64 = sqlx::query(
        "DELETE FROM follows WHERE user_id = $1 AND influencer_id = $2"
    )
    .bind(user_id)
    .bind(influencer_id)
    .execute(&pool)
    .await?
    .rows_affected();

    if deleted > 0 {
        return Ok(Some(false));
    }

    sqlx::query(
        r#"
        INSERT INTO follows (user_id, influencer_id)
        VALUES ($1, $2)
        ON CONFLICT DO NOTHING
        "#
    )
    .bind(user_id)
    .bind(influencer_id)
    .execute(&pool)
    .await?;

    Ok(Some(true))
}

/// Lists the influencers the current user follows, each with their videos
#[instrument(name = "list_following", skip(state, user), fields(user_id = %user.user_id))]
pub async fn list_following_handler(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> HandlerResponse {
    match list_following_internal(&state, user.user_id).await {
        Ok(following) => {
            HandlerResponse::new(StatusCode::OK)
                .data(json!({ "following": following, "count": following.len() }))
                .message("Followed influencers retrieved successfully")
        }
        Err(e) => {
            error!("Failed to list following for {}: {}", user.user_id, e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .data(json!({
                    "error": "following_list_failed",
                    "details": e.to_string()
                }))
                .message("Error fetching followed influencers")
        }
    }
}

async fn list_following_internal(
    state: &AppState,
    user_id: Uuid,
) -> anyhow::Result<Vec<serde_json::Value>> {
    let pool: sqlx::PgPool = state.database.pool().await?;

    let influencer_rows: Vec<sqlx::postgres::PgRow> = sqlx::query(
        r#"
        SELECT i.id, i.name, i.profile_picture, i.bilibili_mid
        FROM follows f
        JOIN influencers i ON i.id = f.influencer_id
        WHERE f.user_id = $1
        ORDER BY f.followed_at DESC
        "#
    )
    .bind(user_id)
    .fetch_all(&pool)
    .await?;

    let influencer_ids: Vec<Uuid> = influencer_rows
        .iter()
        .map(|row| row.get("id"))
        .collect();

    // One query for all videos, grouped in memory
    let video_rows: Vec<sqlx::postgres::PgRow> = sqlx::query(
        r#"
        SELECT id, influencer_id, title, url, thumbnail,
               place_name, longitude, latitude, created_at
        FROM videos
        WHERE influencer_id = ANY($1)
        ORDER BY created_at DESC
        "#
    )
    .bind(&influencer_ids)
    .fetch_all(&pool)
    .await?;

    let mut videos_by_influencer: std::collections::HashMap<Uuid, Vec<serde_json::Value>> =
        std::collections::HashMap::new();

    for row in video_rows {
        let influencer_id: Uuid = row.get("influencer_id");
        videos_by_influencer
            .entry(influencer_id)
            .or_default()
            .push(video_row_to_json(row));
    }

    let following: Vec<serde_json::Value> = influencer_rows
        .into_iter()
        .map(|row| {
            let id: Uuid = row.get("id");
            let name: String = row.get("name");
            let profile_picture: String = row.get("profile_picture");
            let bilibili_mid: Option<String> = row.get("bilibili_mid");
            let videos: Vec<serde_json::Value> =
                videos_by_influencer.remove(&id).unwrap_or_default();

            json!({
                "id": id,
                "name": name,
                "profile_picture": profile_picture,
                "bilibili_mid": bilibili_mid,
                "videos": videos,
            })
        })
        .collect();

    Ok(following)
}
