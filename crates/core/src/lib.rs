//! Core business logic for photoshare-rs.

pub mod services;

pub use services::*;
