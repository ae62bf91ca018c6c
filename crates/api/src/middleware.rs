//! API middleware.

#![allow(missing_docs)]

use axum::{body::Body, extract::State, http::Request, middleware::Next, response::Response};
use photoshare_common::{SignedUrlIssuer, StorageService, TokenIssuer};
use photoshare_core::{CommentService, InteractionService, PhotoService, UserService};

/// Application state: service handles constructed once at startup and
/// passed by reference to every handler. No ambient globals.
#[derive(Clone)]
pub struct AppState {
    pub user_service: UserService,
    pub photo_service: PhotoService,
    pub interaction_service: InteractionService,
    pub comment_service: CommentService,
    pub tokens: TokenIssuer,
    pub storage: StorageService,
    pub urls: SignedUrlIssuer,
}

/// Authentication middleware.
///
/// Verifies an inbound bearer token and stashes the identity in request
/// extensions. Verification failure fails closed: the request proceeds
/// anonymously, and handlers that require identity reject it themselves.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    if let Some(auth_header) = req.headers().get("Authorization")
        && let Ok(auth_str) = auth_header.to_str()
        && let Some(token) = auth_str.strip_prefix("Bearer ")
    {
        match state.tokens.verify(token) {
            Ok(user) => {
                req.extensions_mut().insert(user);
            }
            Err(_) => {
                tracing::debug!("Bearer token failed verification, treating as anonymous");
            }
        }
    }

    next.run(req).await
}
