use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::{
    error::ApiError,
    response::ApiResponse,
    state::AppState,
    trails::repo::{self, Review, Trail},
};

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/trails", get(list_trails))
        .route("/trails/:id", get(get_trail))
        .route("/trails/:id/reviews", get(list_reviews))
        .route("/reviews", post(add_review))
}

#[instrument(skip(state))]
pub async fn list_trails(State(state): State<AppState>) -> Result<Json<Vec<Trail>>, ApiError> {
    let trails = repo::list_trails(&state.db).await?;
    Ok(Json(trails))
}

#[instrument(skip(state))]
pub async fn get_trail(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Trail>, ApiError> {
    let trail = repo::find_trail(&state.db, id)
        .await?
        .ok_or_else(|| ApiError::NotFound("Trail not found".into()))?;
    Ok(Json(trail))
}

#[instrument(skip(state))]
pub async fn list_reviews(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Review>>, ApiError> {
    if repo::find_trail(&state.db, id).await?.is_none() {
        return Err(ApiError::NotFound("Trail not found".into()));
    }
    let reviews = repo::list_reviews(&state.db, id).await?;
    Ok(Json(ApiResponse::success(
        reviews,
        "Reviews fetched successfully.",
    )))
}

#[derive(Debug, Deserialize)]
pub struct AddReviewRequest {
    pub trail_id: Uuid,
    pub user_id: Uuid,
    pub rating: i32,
    pub review_text: String,
}

#[instrument(skip(state, payload))]
pub async fn add_review(
    State(state): State<AppState>,
    Json(payload): Json<AddReviewRequest>,
) -> Result<(StatusCode, Json<ApiResponse<Review>>), ApiError> {
    if !(1..=5).contains(&payload.rating) {
        return Err(ApiError::Validation(
            "rating must be between 1 and 5".into(),
        ));
    }
    if payload.review_text.trim().is_empty() {
        return Err(ApiError::Validation("review_text is required".into()));
    }
    if repo::find_trail(&state.db, payload.trail_id).await?.is_none() {
        return Err(ApiError::NotFound("Trail not found".into()));
    }

    let review = repo::create_review(
        &state.db,
        payload.trail_id,
        payload.user_id,
        payload.rating,
        payload.review_text.trim(),
    )
    .await?;
    info!(review_id = %review.id, trail_id = %review.trail_id, "review added");
    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(
            vec![review],
            "Review added successfully.",
        )),
    ))
}
