//! Like and rating endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::post,
};
use photoshare_common::AppResult;
use photoshare_core::{LikeSummary, RatingSummary};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Rate request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateRequest {
    #[serde(default)]
    pub rating: i32,
}

/// Like a photo.
async fn like_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<LikeSummary>> {
    let summary = state.interaction_service.like(&user.id, &photo_id).await?;
    Ok(ApiResponse::ok(summary))
}

/// Remove a like from a photo.
async fn unlike_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<LikeSummary>> {
    let summary = state
        .interaction_service
        .unlike(&user.id, &photo_id)
        .await?;
    Ok(ApiResponse::ok(summary))
}

/// Rate a photo 1-5 (upsert).
async fn rate_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Json(req): Json<RateRequest>,
) -> AppResult<ApiResponse<RatingSummary>> {
    let summary = state
        .interaction_service
        .rate(&user.id, &photo_id, req.rating)
        .await?;
    Ok(ApiResponse::ok(summary))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/{photo_id}/like", post(like_photo).delete(unlike_photo))
        .route("/{photo_id}/rate", post(rate_photo))
}
