//! Comment endpoints.

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{delete, get},
};
use photoshare_common::AppResult;
use photoshare_core::CommentResponse;
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Add-comment request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddCommentRequest {
    #[serde(default)]
    pub text: String,
}

/// List a photo's comments, newest first.
async fn list_comments(
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<Vec<CommentResponse>>> {
    let comments = state.comment_service.list(&photo_id).await?;
    Ok(ApiResponse::ok(comments))
}

/// Add a comment to a photo.
async fn add_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Json(req): Json<AddCommentRequest>,
) -> AppResult<ApiResponse<CommentResponse>> {
    let comment = state
        .comment_service
        .add(&user, &photo_id, &req.text)
        .await?;
    Ok(ApiResponse::created(comment))
}

/// Delete a comment (author only).
async fn delete_comment(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path((photo_id, comment_id)): Path<(String, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .comment_service
        .delete(&user.id, &photo_id, &comment_id)
        .await?;
    Ok(ApiResponse::ok(()).with_message("Comment deleted"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/{photo_id}/comments",
            get(list_comments).post(add_comment),
        )
        .route(
            "/{photo_id}/comments/{comment_id}",
            delete(delete_comment),
        )
}
