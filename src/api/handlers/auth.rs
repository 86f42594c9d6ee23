use axum::{extract::State, http::StatusCode, Json};
use serde::{Deserialize, Serialize};

use crate::api::errors::ApiError;
use crate::api::extract::JsonBody;
use crate::auth::jwt::create_token;
use crate::auth::password::verify_password;
use crate::domain::user::Email;
use crate::state::AppState;

/// Request body for user login
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Response from successful login
#[derive(Debug, Serialize, Deserialize)]
pub struct LoginResponse {
    pub access_token: String,
    pub user_id: i64,
    pub root: bool,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmEmailRequest {
    pub email: String,
    pub confirmation_token: String,
}

/// Login with email and password
///
/// POST /api/v1/auth/token
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let email = Email::new(&req.email)
        .map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    let user = state
        .stores
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    let valid = verify_password(&req.password, &user.encrypted_password)
        .map_err(|e| ApiError::internal_server_error(e.to_string()))?;

    if !valid {
        return Err(ApiError::unauthorized("Invalid credentials"));
    }

    if !user.is_confirmed() {
        return Err(ApiError::unauthorized("Email address is not confirmed yet"));
    }

    let jwt = &state.config.jwt;
    let access_token = create_token(user.id, user.root, &jwt.secret, jwt.ttl_hours)
        .map_err(|e| ApiError::internal_server_error(format!("Failed to create token: {}", e)))?;

    tracing::info!(user_id = user.id, "user logged in");

    Ok(Json(LoginResponse {
        access_token,
        user_id: user.id,
        root: user.root,
    }))
}

/// Confirm the email address of an account
///
/// POST /api/v1/auth/confirm_email
#[tracing::instrument(skip_all)]
pub async fn confirm_email(
    State(state): State<AppState>,
    JsonBody(req): JsonBody<ConfirmEmailRequest>,
) -> Result<StatusCode, ApiError> {
    let email = Email::new(&req.email)?;

    let mut user = state
        .stores
        .users
        .find_by_email(&email)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid confirmation token"))?;

    user.confirm_email(&req.confirmation_token)?;
    state.stores.users.update(&user).await?;

    tracing::info!(user_id = user.id, "email confirmed");
    Ok(StatusCode::NO_CONTENT)
}

/// Heartbeat
///
/// GET /ping
pub async fn ping() -> &'static str {
    "pong"
}
