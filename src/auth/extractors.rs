use async_trait::async_trait;
use axum::{extract::FromRequestParts, http::request::Parts};
use tracing::warn;
use uuid::Uuid;

use crate::{auth::jwt::TokenError, error::AppError, state::AppState};

/// Caller id taken from a verified `Authorization: Bearer <jwt>` header.
///
/// This only proves the token is genuine; services still resolve the id
/// against the credential store before acting on it. Every client-side
/// rejection reads "User not found"; an unreachable token backend is a 503.
pub struct AuthUser(pub Uuid);

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let auth = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|h| h.to_str().ok())
            .ok_or_else(|| {
                warn!("missing Authorization header");
                AppError::user_not_found()
            })?;

        let token = auth
            .strip_prefix("Bearer ")
            .or_else(|| auth.strip_prefix("bearer "))
            .ok_or_else(|| {
                warn!("invalid auth scheme");
                AppError::user_not_found()
            })?;

        let user_id = state.tokens.verify(token.trim()).map_err(|e| match e {
            TokenError::Invalid => {
                warn!("bearer token rejected");
                AppError::user_not_found()
            }
            TokenError::Unavailable(msg) => AppError::TokenUnavailable(msg),
        })?;

        Ok(AuthUser(user_id))
    }
}
