//! HTTP API layer for photoshare-rs.
//!
//! This crate provides the REST API:
//!
//! - **Endpoints**: auth, photos, interactions, comments, discovery, blobs
//! - **Extractors**: required and optional caller identity
//! - **Middleware**: bearer-token verification (fails closed to anonymous)
//! - **Response**: the `{success, data, pagination}` envelope
//!
//! Built on Axum 0.8 with Tower middleware stack.

pub mod endpoints;
pub mod extractors;
pub mod middleware;
pub mod response;

pub use endpoints::router;
pub use response::ApiResponse;
