//! Discovery endpoints: search and platform stats.

use axum::{
    Router,
    extract::{Query, State},
    routing::get,
};
use photoshare_common::AppResult;
use photoshare_core::{PhotoResponse, PlatformStats};
use serde::Deserialize;

use crate::{extractors::MaybeAuthUser, middleware::AppState, response::ApiResponse};

/// Search parameters.
#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    pub q: String,
}

/// Free-text photo search.
async fn search_photos(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> AppResult<ApiResponse<Vec<PhotoResponse>>> {
    let photos = state.photo_service.search(&params.q, user.as_ref()).await?;
    Ok(ApiResponse::ok(photos))
}

/// Platform statistics.
async fn get_stats(State(state): State<AppState>) -> AppResult<ApiResponse<PlatformStats>> {
    let stats = state.photo_service.stats().await?;
    Ok(ApiResponse::ok(stats))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/search", get(search_photos))
        .route("/stats", get(get_stats))
}
