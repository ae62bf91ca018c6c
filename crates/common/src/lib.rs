//! Common utilities and shared types for photoshare-rs.
//!
//! This crate provides foundational components used across all photoshare-rs
//! crates:
//!
//! - **Configuration**: Application settings via [`Config`]
//! - **Error handling**: Unified error types via [`AppError`] and [`AppResult`]
//! - **Authentication**: Bearer token issuing/verification via [`TokenIssuer`]
//! - **ID Generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Storage**: Blob storage backends and signed-URL minting

pub mod auth;
pub mod config;
pub mod error;
pub mod id;
pub mod storage;

pub use auth::{AuthenticatedUser, Claims, Role, TokenIssuer, TokenSubject};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
pub use storage::{LocalStorage, NoOpStorage, SignedUrlIssuer, StorageBackend, StorageService};
