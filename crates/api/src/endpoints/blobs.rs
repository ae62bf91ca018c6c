//! Blob serving endpoint.
//!
//! Serves stored assets for the local storage backend. Access requires a
//! valid, unexpired signature minted by the listing pipeline; raw blob
//! paths are never readable without one.

use axum::{
    Router,
    extract::{Path, Query, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};
use photoshare_common::{AppError, AppResult};
use serde::Deserialize;

use crate::middleware::AppState;

/// Signed access parameters, as minted into asset URLs.
#[derive(Debug, Deserialize)]
pub struct BlobAccessParams {
    #[serde(default)]
    pub se: Option<i64>,
    #[serde(default)]
    pub sig: Option<String>,
}

/// Serve a blob, verifying its access token.
async fn serve_blob(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Query(params): Query<BlobAccessParams>,
) -> AppResult<Response> {
    let (Some(expiry), Some(sig)) = (params.se, params.sig) else {
        return Err(AppError::Unauthorized);
    };

    if !state.urls.verify(&name, expiry, &sig) {
        return Err(AppError::Unauthorized);
    }

    let data = state
        .storage
        .load(&name)
        .await
        .map_err(|_| AppError::NotFound(format!("Blob: {name}")))?;

    Ok((
        [
            (header::CONTENT_TYPE, content_type_for(&name)),
            (header::CACHE_CONTROL, "public, max-age=31536000"),
        ],
        data,
    )
        .into_response())
}

/// Content type from the blob's extension.
fn content_type_for(name: &str) -> &'static str {
    match name.rsplit('.').next() {
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("png") => "image/png",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        Some("avif") => "image/avif",
        _ => "application/octet-stream",
    }
}

pub fn router() -> Router<AppState> {
    Router::new().route("/{name}", get(serve_blob))
}
