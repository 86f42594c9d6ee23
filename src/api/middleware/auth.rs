use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts},
};

use crate::api::errors::ApiError;
use crate::auth::jwt::verify_token;
use crate::domain::principal::Principal;
use crate::state::AppState;

/// JWT authentication extractor for protected routes
///
/// Yields the [`Principal`] named by a valid bearer token. Anything else,
/// including a token whose subject is not a positive id, is a 401.
///
/// Usage:
/// ```rust,ignore
/// async fn protected_handler(
///     JwtAuth(principal): JwtAuth,
/// ) -> Result<String, ApiError> {
///     Ok(format!("Hello user {}", principal.user_id))
/// }
/// ```
pub struct JwtAuth(pub Principal);

#[async_trait]
impl FromRequestParts<AppState> for JwtAuth {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| ApiError::unauthorized("Missing authorization header"))?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            ApiError::unauthorized("Invalid authorization format. Use: Bearer <token>")
        })?;

        let claims = verify_token(token, &state.config.jwt.secret)
            .map_err(|e| ApiError::unauthorized(format!("Invalid token: {}", e)))?;

        let principal = claims
            .principal()
            .ok_or_else(|| ApiError::unauthorized("Invalid token subject"))?;

        Ok(JwtAuth(principal))
    }
}
