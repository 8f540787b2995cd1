use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// Error taxonomy for every handler. Each variant maps to exactly one
/// HTTP outcome; nothing on a request path is allowed to panic.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    Validation(String),

    #[error("It seems you already have an account, please log in instead.")]
    DuplicateEmail,

    #[error("Invalid email or password. Please try again with the correct credentials.")]
    InvalidCredentials,

    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    NotFound(String),

    #[error(transparent)]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::DuplicateEmail => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::InvalidCredentials | ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        // Forward the underlying message, never a backtrace
        let message = self.to_string();
        if status.is_server_error() {
            error!(%status, %message, "request failed");
        }
        let label = if status.is_server_error() {
            "error"
        } else {
            "failed"
        };
        let body = json!({
            "status": label,
            "data": [],
            "message": message,
        });
        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_email_maps_to_422() {
        assert_eq!(
            ApiError::DuplicateEmail.status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn credential_failures_share_one_shape() {
        // Unknown email and wrong password must be indistinguishable
        let a = ApiError::InvalidCredentials.to_string();
        let b = ApiError::InvalidCredentials.to_string();
        assert_eq!(a, b);
        assert_eq!(ApiError::InvalidCredentials.status(), StatusCode::UNAUTHORIZED);
    }

    #[test]
    fn internal_errors_use_error_label() {
        let resp = ApiError::Internal(anyhow::anyhow!("db down")).into_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn not_found_maps_to_404() {
        let err = ApiError::NotFound("Trail not found".into());
        assert_eq!(err.status(), StatusCode::NOT_FOUND);
        assert_eq!(err.to_string(), "Trail not found");
    }
}
