use axum::{
    extract::{Request, State},
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use serde_json::json;
use uuid::Uuid;

use crate::config::state::AppState;
use crate::database::SessionData;
use crate::utils::response_handler::HandlerResponse;

/// Authenticated user attached to request extensions by the middleware
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
    pub token: String,
}

/// Middleware guarding authenticated routes: resolves the Bearer token
/// against the Redis session store and verifies the user still exists.
pub async fn session_middleware(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, HandlerResponse> {
    // 1. Extract Bearer token from the Authorization header
    let token: &str = headers
        .get("authorization")
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or_else(|| {
            HandlerResponse::new(StatusCode::UNAUTHORIZED)
                .message("Not authorized, no token")
                .data(json!({ "error": "missing_token" }))
        })?;

    // 2. Resolve the session (unknown and expired tokens look the same)
    let session: SessionData = state.redis
        .load_session(token)
        .await
        .map_err(|e| {
            tracing::error!("Session lookup error: {}", e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .message("Internal Service Error")
        })?
        .ok_or_else(|| {
            HandlerResponse::new(StatusCode::UNAUTHORIZED)
                .message("Not authorized, token failed")
                .data(json!({ "error": "invalid_token" }))
        })?;

    // 3. The session may outlive the account; confirm the user row exists
    let pool: sqlx::PgPool = state.database.pool().await.map_err(|e| {
        tracing::error!("DB Pool error: {}", e);
        HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
            .message("Internal Service Error")
    })?;

    let exists: bool = sqlx::query_scalar(
        "SELECT EXISTS(SELECT 1 FROM users WHERE id = $1)"
    )
    .bind(session.user_id)
    .fetch_one(&pool)
    .await
    .map_err(|e| {
        tracing::error!("DB Query error: {}", e);
        HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
            .message("Internal Service Error")
    })?;

    if !exists {
        return Err(HandlerResponse::new(StatusCode::UNAUTHORIZED)
            .message("Not authorized, user not found")
            .data(json!({ "error": "user_not_found" })));
    }

    // 4. Store in Request Extensions
    // This makes the authenticated user available to subsequent handlers
    request.extensions_mut().insert(CurrentUser {
        user_id: session.user_id,
        username: session.username,
        email: session.email,
        token: token.to_string(),
    });

    // 5. Proceed
    Ok(next.run(request).await)
}
