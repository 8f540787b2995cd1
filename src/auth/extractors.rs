use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use uuid::Uuid;

use crate::{auth::jwt::JwtKeys, error::ApiError};

pub const SESSION_COOKIE: &str = "SessionID";

/// Gate for protected routes: validates the bearer token and yields the
/// user id it is bound to. The token may arrive in the Authorization
/// header or in the session cookie set at login.
#[derive(Debug)]
pub struct AuthUser(pub Uuid);

fn bearer_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer ").or_else(|| v.strip_prefix("bearer ")))
}

fn cookie_token(parts: &Parts) -> Option<&str> {
    parts
        .headers
        .get(axum::http::header::COOKIE)
        .and_then(|v| v.to_str().ok())?
        .split(';')
        .map(str::trim)
        .find_map(|pair| pair.strip_prefix(SESSION_COOKIE).and_then(|rest| rest.strip_prefix('=')))
}

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)
            .or_else(|| cookie_token(parts))
            .ok_or_else(|| {
                ApiError::Unauthorized("This session has expired. Please login.".into())
            })?;

        let keys = JwtKeys::from_ref(state);
        let claims = keys.verify(token).map_err(|_| {
            tracing::warn!("invalid or expired token");
            ApiError::Unauthorized("This session has expired. Please login.".into())
        })?;

        Ok(AuthUser(claims.sub))
    }
}
