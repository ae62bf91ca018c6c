//! Database repositories.

#![allow(missing_docs)]

pub mod comment;
pub mod like;
pub mod photo;
pub mod rating;
pub mod user;

pub use comment::CommentRepository;
pub use like::LikeRepository;
pub use photo::PhotoRepository;
pub use rating::RatingRepository;
pub use user::UserRepository;
