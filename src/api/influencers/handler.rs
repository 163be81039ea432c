// Influencer management handlers

use serde::Deserialize;
use serde_json::json;
use axum::{extract::{Path, State}, http::StatusCode, Json};
use sqlx::Row;
use uuid::Uuid;

use crate::config::state::AppState;
use crate::utils::response_handler::HandlerResponse;
use tracing::{error, info, instrument};

#[derive(Debug, Deserialize)]
pub struct CreateInfluencerRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub profile_picture: String,
    pub bilibili_mid: Option<String>,
}

/// Lists all influencers with their follower counts and usernames
#[instrument(name = "list_influencers", skip(state))]
pub async fn list_influencers_handler(
    State(state): State<AppState>,
) -> HandlerResponse {
    match list_influencers_internal(&state).await {
        Ok(influencers) => {
            info!("Successfully retrieved {} influencers", influencers.len());
            HandlerResponse::new(StatusCode::OK)
                .data(json!({ "influencers": influencers, "count": influencers.len() }))
                .message("Influencers retrieved successfully")
        }
        Err(e) => {
            error!("Failed to list influencers: {}", e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .data(json!({
                    "error": "influencer_list_failed",
                    "details": e.to_string()
                }))
                .message("Error fetching influencers")
        }
    }
}

async fn list_influencers_internal(state: &AppState) -> anyhow::Result<Vec<serde_json::Value>> {
    let pool: sqlx::PgPool = state.database.pool().await?;

    let rows: Vec<sqlx::postgres::PgRow> = sqlx::query(
        r#"
        SELECT i.id, i.name, i.profile_picture, i.bilibili_mid, i.created_at,
               COUNT(f.user_id) AS follower_count,
               COALESCE(
                   ARRAY_AGG(u.username) FILTER (WHERE u.username IS NOT NULL),
                   ARRAY[]::VARCHAR[]
               ) AS follower_usernames
        FROM influencers i
        LEFT JOIN follows f ON f.influencer_id = i.id
        LEFT JOIN users u ON u.id = f.user_id
        GROUP BY i.id
        ORDER BY i.created_at DESC
        "#
    )
    .fetch_all(&pool)
    .await?;

    let influencers: Vec<serde_json::Value> = rows
        .into_iter()
        .map(|row| {
            let id: Uuid = row.get("id");
            let name: String = row.get("name");
            let profile_picture: String = row.get("profile_picture");
            let bilibili_mid: Option<String> = row.get("bilibili_mid");
            let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");
            let follower_count: i64 = row.get("follower_count");
            let follower_usernames: Vec<String> = row.get("follower_usernames");

            json!({
                "id": id,
                "name": name,
                "profile_picture": profile_picture,
                "bilibili_mid": bilibili_mid,
                "follower_count": follower_count,
                "follower_usernames": follower_usernames,
                "created_at": created_at.to_rfc3339(),
            })
        })
        .collect();

    Ok(influencers)
}

/// Creates a new influencer; bilibili_mid is optional and enables crawling
#[instrument(name = "create_influencer", skip(state, request), fields(name = %request.name))]
pub async fn create_influencer_handler(
    State(state): State<AppState>,
    Json(request): Json<CreateInfluencerRequest>,
) -> HandlerResponse {
    if let Some(rejection) = validate_create_request(&request) {
        return rejection;
    }

    match create_influencer_internal(&state, &request).await {
        Ok(influencer) => {
            info!("Successfully created influencer: {}", request.name);
            HandlerResponse::new(StatusCode::CREATED)
                .data(influencer)
                .message("Influencer created successfully")
        }
        Err(e) => {
            if let Some(db_error) = e.downcast_ref::<sqlx::Error>() {
                if let sqlx::Error::Database(db_err) = db_error {
                    if db_err.code().as_deref() == Some("23505") {
                        return HandlerResponse::new(StatusCode::CONFLICT)
                            .data(json!({ "error": "duplicate_bilibili_mid" }))
                            .message("An influencer with this Bilibili mid already exists");
                    }
                }
            }

            error!("Failed to create influencer '{}': {}", request.name, e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .data(json!({
                    "error": "influencer_creation_failed",
                    "details": e.to_string()
                }))
                .message("Error creating influencer")
        }
    }
}

/// Input validation for influencer creation; None means the request is valid
fn validate_create_request(request: &CreateInfluencerRequest) -> Option<HandlerResponse> {
    if request.name.trim().is_empty() || request.profile_picture.trim().is_empty() {
        return Some(
            HandlerResponse::new(StatusCode::BAD_REQUEST)
                .data(json!({ "error": "missing_fields" }))
                .message("Please provide name and profile picture"),
        );
    }

    // Character count, not byte length: CJK creator names are the norm here
    if request.name.chars().count() > 100 {
        return Some(
            HandlerResponse::new(StatusCode::BAD_REQUEST)
                .data(json!({ "error": "name cannot exceed 100 characters" }))
                .message("Influencer name too long"),
        );
    }

    // A Bilibili mid is a numeric account id
    if let Some(mid) = request.bilibili_mid.as_deref() {
        if mid.is_empty() || !mid.chars().all(|c: char| c.is_ascii_digit()) {
            return Some(
                HandlerResponse::new(StatusCode::BAD_REQUEST)
                    .data(json!({ "error": "bilibili_mid must be a numeric account id" }))
                    .message("Invalid Bilibili mid"),
            );
        }
    }

    None
}

async fn create_influencer_internal(
    state: &AppState,
    request: &CreateInfluencerRequest,
) -> anyhow::Result<serde_json::Value> {
    let pool: sqlx::PgPool = state.database.pool().await?;

    let row: sqlx::postgres::PgRow = sqlx::query(
        r#"
        INSERT INTO influencers (name, profile_picture, bilibili_mid)
        VALUES ($1, $2, $3)
        RETURNING id, created_at
        "#
    )
    .bind(request.name.trim())
    .bind(request.profile_picture.trim())
    .bind(request.bilibili_mid.as_deref())
    .fetch_one(&pool)
    .await?;

    let id: Uuid = row.get("id");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    Ok(json!({
        "id": id,
        "name": request.name.trim(),
        "profile_picture": request.profile_picture.trim(),
        "bilibili_mid": request.bilibili_mid,
        "created_at": created_at.to_rfc3339(),
    }))
}

/// Lists one influencer's videos, newest first
#[instrument(name = "list_influencer_videos", skip(state))]
pub async fn list_videos_handler(
    State(state): State<AppState>,
    Path(influencer_id): Path<Uuid>,
) -> HandlerResponse {
    match list_videos_internal(&state, influencer_id).await {
        Ok(Some(videos)) => {
            HandlerResponse::new(StatusCode::OK)
                .data(json!({ "videos": videos, "count": videos.len() }))
                .message("Videos retrieved successfully")
        }
        Ok(None) => {
            HandlerResponse::new(StatusCode::NOT_FOUND)
                .data(json!({ "error": "influencer_not_found" }))
                .message("Influencer not found")
        }
        Err(e) => {
            error!("Failed to list videos for {}: {}", influencer_id, e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .data(json!({
                    "error": "video_list_failed",
                    "details": e.to_string()
                }))
                .message("Error fetching videos")
        }
    }
}

async fn list_videos_internal(
    state: &AppState,
    influencer_id: Uuid,
) -> anyhow::Result<Option<Vec<serde_json::Value>>> {
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

    let rows: Vec<sqlx::postgres::PgRow> = sqlx::query(
        r#"
        SELECT id, title, url, thumbnail, place_name, longitude, latitude, created_at
        FROM videos
        WHERE influencer_id = $1
        ORDER BY created_at DESC
        "#
    )
    .bind(influencer_id)
    .fetch_all(&pool)
    .await?;

    Ok(Some(rows.into_iter().map(video_row_to_json).collect()))
}

/// Shared row mapping for video listings; the GeoJSON-style location is
/// only present when coordinates were extracted
pub(crate) fn video_row_to_json(row: sqlx::postgres::PgRow) -> serde_json::Value {
    let id: Uuid = row.get("id");
    let title: String = row.get("title");
    let url: String = row.get("url");
    let thumbnail: String = row.get("thumbnail");
    let place_name: Option<String> = row.get("place_name");
    let longitude: Option<f64> = row.get("longitude");
    let latitude: Option<f64> = row.get("latitude");
    let created_at: chrono::DateTime<chrono::Utc> = row.get("created_at");

    let location: serde_json::Value = match (longitude, latitude) {
        (Some(lon), Some(lat)) => json!({
            "type": "Point",
            "coordinates": [lon, lat],
            "place_name": place_name,
        }),
        _ => serde_json::Value::Null,
    };

    json!({
        "id": id,
        "title": title,
        "url": url,
        "thumbnail": thumbnail,
        "location": location,
        "created_at": created_at.to_rfc3339(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(name: &str, picture: &str, mid: Option<&str>) -> CreateInfluencerRequest {
        CreateInfluencerRequest {
            name: name.to_string(),
            profile_picture: picture.to_string(),
            bilibili_mid: mid.map(String::from),
        }
    }

    #[test]
    fn accepts_long_cjk_name() {
        // 34 Chinese characters is over 100 bytes but well under 100 chars
        let name: String = "味".repeat(34);
        assert!(name.len() > 100);

        let result = validate_create_request(&request(&name, "https://example.com/a.jpg", None));
        assert!(result.is_none());
    }

    #[test]
    fn rejects_name_over_100_characters() {
        let name: String = "味".repeat(101);

        let rejection: HandlerResponse =
            validate_create_request(&request(&name, "https://example.com/a.jpg", None)).unwrap();
        assert_eq!(rejection.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(rejection.messages[0], "Influencer name too long");
    }

    #[test]
    fn rejects_missing_fields() {
        let rejection: HandlerResponse =
            validate_create_request(&request("  ", "https://example.com/a.jpg", None)).unwrap();
        assert_eq!(rejection.status_code, StatusCode::BAD_REQUEST);

        let rejection: HandlerResponse =
            validate_create_request(&request("老番茄", "", None)).unwrap();
        assert_eq!(rejection.status_code, StatusCode::BAD_REQUEST);
    }

    #[test]
    fn rejects_non_numeric_mid() {
        let rejection: HandlerResponse =
            validate_create_request(&request("老番茄", "https://example.com/a.jpg", Some("abc123"))).unwrap();
        assert_eq!(rejection.status_code, StatusCode::BAD_REQUEST);
        assert_eq!(rejection.messages[0], "Invalid Bilibili mid");
    }

    #[test]
    fn accepts_numeric_mid() {
        let result =
            validate_create_request(&request("老番茄", "https://example.com/a.jpg", Some("546195")));
        assert!(result.is_none());
    }
}
