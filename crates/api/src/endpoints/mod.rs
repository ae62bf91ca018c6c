//! API endpoints.

#![allow(missing_docs)]

pub mod auth;
pub mod blobs;
pub mod comments;
pub mod discovery;
pub mod interactions;
pub mod photos;

use axum::Router;

use crate::middleware::AppState;

/// Assemble the `/api` router.
pub fn router() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        .nest(
            "/photos",
            photos::router()
                .merge(interactions::router())
                .merge(comments::router()),
        )
        .merge(discovery::router())
}
