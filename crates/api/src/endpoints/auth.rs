//! Authentication and profile endpoints.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use photoshare_common::AppResult;
use photoshare_core::{RegisterInput, Session, UpdateProfileInput, UserResponse};
use serde::Deserialize;

use crate::{extractors::AuthUser, middleware::AppState, response::ApiResponse};

/// Login request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Register a new account.
async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterInput>,
) -> AppResult<ApiResponse<Session>> {
    let session = state.user_service.register(input).await?;
    Ok(ApiResponse::created(session).with_message("Registration successful"))
}

/// Log in to an existing account.
async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<ApiResponse<Session>> {
    let session = state.user_service.login(&req.email, &req.password).await?;
    Ok(ApiResponse::ok(session).with_message("Login successful"))
}

/// Get the caller's fresh profile.
async fn get_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
) -> AppResult<ApiResponse<UserResponse>> {
    let profile = state.user_service.get_profile(&user.id).await?;
    Ok(ApiResponse::ok(profile))
}

/// Update the caller's profile.
async fn update_profile(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(input): Json<UpdateProfileInput>,
) -> AppResult<ApiResponse<UserResponse>> {
    let profile = state.user_service.update_profile(&user.id, input).await?;
    Ok(ApiResponse::ok(profile).with_message("Profile updated successfully"))
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
        .route("/profile", get(get_profile).put(update_profile))
}
