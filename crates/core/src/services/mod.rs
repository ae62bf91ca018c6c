//! Business logic services.

#![allow(missing_docs)]

pub mod comment;
pub mod interaction;
pub mod photo;
pub mod user;
pub mod vision;

pub use comment::{CommentAuthor, CommentResponse, CommentService};
pub use interaction::{InteractionService, LikeSummary, RatingSummary};
pub use photo::{
    CreatorInfo, ListPhotosInput, PageInfo, PhotoPage, PhotoResponse, PhotoService, PlatformStats,
    UpdatePhotoInput, UploadPhotoInput,
};
pub use user::{RegisterInput, Session, UpdateProfileInput, UserResponse, UserService};
pub use vision::{AdultVerdict, ImageAnalysis, VisionService};
