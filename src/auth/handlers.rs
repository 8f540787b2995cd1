use axum::{
    extract::{FromRef, State},
    http::{header::SET_COOKIE, HeaderMap, StatusCode},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use tracing::{info, instrument};

use crate::{
    auth::{
        dto::{LoginData, LoginRequest, RegisterHikerRequest, RegisterResponderRequest},
        extractors::{AuthUser, SESSION_COOKIE},
        jwt::JwtKeys,
        repo::RoleProfile,
        services,
    },
    error::ApiError,
    response::ApiResponse,
    state::AppState,
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register/hiker", post(register_hiker))
        .route("/register/responder", post(register_responder))
        .route("/login", post(login))
        .route("/logout", post(logout))
        .route("/verified", get(verified))
}

async fn handle_register(
    state: &AppState,
    username: String,
    email: String,
    password: &str,
    profile: RoleProfile,
) -> Result<(StatusCode, Json<ApiResponse<crate::auth::repo::User>>), ApiError> {
    let email = services::normalize_email(&email);
    if !services::is_valid_email(&email) {
        return Err(ApiError::Validation("Enter a valid email address".into()));
    }

    let user = services::register(&state.db, username, email, password, profile).await?;
    info!(user_id = %user.id, role = user.profile.role_tag(), "user registered");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            vec![user],
            "Thank you for registering with us. Your account has been successfully created.",
        )),
    ))
}

#[instrument(skip(state, payload))]
pub async fn register_hiker(
    State(state): State<AppState>,
    Json(payload): Json<RegisterHikerRequest>,
) -> Result<(StatusCode, Json<ApiResponse<crate::auth::repo::User>>), ApiError> {
    let profile = payload.profile();
    handle_register(
        &state,
        payload.username,
        payload.email,
        &payload.password,
        profile,
    )
    .await
}

#[instrument(skip(state, payload))]
pub async fn register_responder(
    State(state): State<AppState>,
    Json(payload): Json<RegisterResponderRequest>,
) -> Result<(StatusCode, Json<ApiResponse<crate::auth::repo::User>>), ApiError> {
    let profile = payload.profile();
    handle_register(
        &state,
        payload.username,
        payload.email,
        &payload.password,
        profile,
    )
    .await
}

#[instrument(skip(state, payload))]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> Result<(HeaderMap, Json<ApiResponse<LoginData>>), ApiError> {
    let email = services::normalize_email(&payload.email);
    if !services::is_valid_email(&email) {
        return Err(ApiError::Validation("Enter a valid email address".into()));
    }
    if payload.password.is_empty() {
        return Err(ApiError::Validation("Password is required".into()));
    }

    let user = services::authenticate(&state.db, &email, &payload.password).await?;

    let keys = JwtKeys::from_ref(&state);
    let token = keys.sign(user.id)?;

    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        format!(
            "{SESSION_COOKIE}={token}; Max-Age={}; Path=/; HttpOnly; Secure; SameSite=None",
            keys.ttl.as_secs()
        )
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("set-cookie header: {e}")))?,
    );

    info!(user_id = %user.id, "user logged in");
    Ok((
        headers,
        Json(ApiResponse::success(
            vec![LoginData { token, user }],
            "You have successfully logged in.",
        )),
    ))
}

/// Clears the session cookie. The token itself stays valid until expiry;
/// only the client-held artifact is discarded.
#[instrument]
pub async fn logout() -> Result<(HeaderMap, Json<ApiResponse<()>>), ApiError> {
    let mut headers = HeaderMap::new();
    headers.insert(
        SET_COOKIE,
        format!("{SESSION_COOKIE}=; Max-Age=0; Path=/; HttpOnly; Secure; SameSite=None")
            .parse()
            .map_err(|e| ApiError::Internal(anyhow::anyhow!("set-cookie header: {e}")))?,
    );
    Ok((
        headers,
        Json(ApiResponse::success(vec![], "You have been logged out.")),
    ))
}

#[instrument(skip_all)]
pub async fn verified(AuthUser(user_id): AuthUser) -> Json<serde_json::Value> {
    tracing::debug!(%user_id, "verified route hit");
    Json(json!({ "message": "Welcome to Trailblaze!" }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn logout_clears_the_session_cookie() {
        let (headers, Json(body)) = logout().await.expect("logout succeeds");
        let cookie = headers
            .get(SET_COOKIE)
            .and_then(|v| v.to_str().ok())
            .expect("set-cookie present");
        assert!(cookie.starts_with("SessionID=;"));
        assert!(cookie.contains("Max-Age=0"));
        assert!(cookie.contains("HttpOnly"));
        assert_eq!(body.status, "success");
        assert!(body.data.is_empty());
    }

    #[test]
    fn malformed_emails_are_rejected_before_the_service() {
        assert!(!services::is_valid_email("nope"));
        assert!(services::is_valid_email("a@x.com"));
    }
}
