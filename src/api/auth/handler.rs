use axum::{extract::{Extension, State}, Json, http::StatusCode};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;
use bcrypt::{hash, verify, DEFAULT_COST};

use crate::api::middleware::CurrentUser;
use crate::config::state::AppState;
use crate::database::SessionData;
use crate::utils::response_handler::HandlerResponse;

// =============================================================================
// DTOs
// =============================================================================

#[derive(Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user_id: Uuid,
    pub username: String,
}

// =============================================================================
// HANDLERS
// =============================================================================

/// Register a new user
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> HandlerResponse {
    // 1. Validate input
    if payload.username.trim().is_empty()
        || payload.email.trim().is_empty()
        || payload.password.is_empty()
    {
        return HandlerResponse::new(StatusCode::BAD_REQUEST)
            .message("Please provide username, email and password")
            .data(json!({ "error": "missing_fields" }));
    }

    // 2. Hash Password
    let password_hash: String = match hash(payload.password.as_bytes(), DEFAULT_COST) {
        Ok(h) => h,
        Err(e) => {
            return HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .message("Failed to process password")
                .data(json!({ "error": e.to_string() }));
        }
    };

    // 3. Insert User
    let result: anyhow::Result<Uuid> = insert_user(
        &state,
        payload.username.trim(),
        payload.email.trim(),
        &password_hash,
    ).await;

    match result {
        Ok(user_id) => {
            HandlerResponse::new(StatusCode::CREATED)
                .message("User registered successfully")
                .data(json!({ "user_id": user_id }))
        }
        Err(e) => {
            // Handle duplicate username/email (Postgres error code 23505)
            if let Some(db_error) = e.downcast_ref::<sqlx::Error>() {
                if let sqlx::Error::Database(db_err) = db_error {
                    if db_err.code().as_deref() == Some("23505") {
                        return HandlerResponse::new(StatusCode::CONFLICT)
                            .message("Username or email already registered")
                            .data(json!({ "error": "duplicate_user" }));
                    }
                }
            }

            tracing::error!("Registration failed: {}", e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .message("Registration failed")
                .data(json!({ "error": e.to_string() }))
        }
    }
}

async fn insert_user(
    state: &AppState,
    username: &str,
    email: &str,
    password_hash: &str,
) -> anyhow::Result<Uuid> {
    let pool: sqlx::PgPool = state.database.pool().await?;

    let user_id: Uuid = sqlx::query_scalar(
        r#"
        INSERT INTO users (username, email, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id
        "#
    )
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .fetch_one(&pool)
    .await?;

    Ok(user_id)
}

/// Login and create a session
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> HandlerResponse {
    // 1. Validate input
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return HandlerResponse::new(StatusCode::BAD_REQUEST)
            .message("Please provide email and password")
            .data(json!({ "error": "missing_fields" }));
    }

    // 2. Fetch User
    let user_result: anyhow::Result<Option<(Uuid, String, String)>> =
        fetch_user_by_email(&state, payload.email.trim()).await;

    match user_result {
        Ok(Some((user_id, username, stored_hash))) => {
            // 3. Verify Password
            if !verify(payload.password.as_bytes(), &stored_hash).unwrap_or(false) {
                // Same response as unknown email, on purpose
                return HandlerResponse::new(StatusCode::UNAUTHORIZED)
                    .message("Invalid credentials");
            }

            // 4. Generate Session Token and store it in Redis
            let session_token: String = Uuid::new_v4().to_string();
            let session: SessionData = SessionData {
                user_id,
                username: username.clone(),
                email: payload.email.trim().to_string(),
            };

            if let Err(e) = state.redis.store_session(&session_token, &session).await {
                return HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                    .message("Failed to create session")
                    .data(json!({ "error": e.to_string() }));
            }

            // 5. Return Token
            HandlerResponse::new(StatusCode::OK)
                .message("Login successful")
                .data(json!(AuthResponse {
                    token: session_token,
                    user_id,
                    username,
                }))
        }
        Ok(None) => {
            HandlerResponse::new(StatusCode::UNAUTHORIZED)
                .message("Invalid credentials")
        }
        Err(e) => {
            tracing::error!("Login failed: {}", e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .message("Login failed")
                .data(json!({ "error": e.to_string() }))
        }
    }
}

async fn fetch_user_by_email(
    state: &AppState,
    email: &str,
) -> anyhow::Result<Option<(Uuid, String, String)>> {
    let pool: sqlx::PgPool = state.database.pool().await?;

    let row: Option<(Uuid, String, String)> = sqlx::query_as(
        r#"
        SELECT id, username, password_hash
        FROM users
        WHERE email = $1
        "#
    )
    .bind(email)
    .fetch_optional(&pool)
    .await?;

    Ok(row)
}

/// Logout: drops the current session token from Redis
pub async fn logout(
    State(state): State<AppState>,
    Extension(user): Extension<CurrentUser>,
) -> HandlerResponse {
    match state.redis.delete_session(&user.token).await {
        Ok(()) => {
            HandlerResponse::new(StatusCode::OK)
                .message("Logged out successfully")
        }
        Err(e) => {
            tracing::error!("Logout failed for user {}: {}", user.user_id, e);
            HandlerResponse::new(StatusCode::INTERNAL_SERVER_ERROR)
                .message("Logout failed")
                .data(json!({ "error": e.to_string() }))
        }
    }
}
