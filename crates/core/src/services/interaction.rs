//! Interaction service: likes and ratings.
//!
//! All aggregate counters are maintained with single-statement atomic
//! updates, so concurrent interactions on the same photo cannot lose
//! increments.

use photoshare_common::{AppError, AppResult, IdGenerator};
use photoshare_db::entities::{photo_like, rating};
use photoshare_db::repositories::{
    LikeRepository, PhotoRepository, RatingRepository, UserRepository,
};
use sea_orm::Set;
use serde::Serialize;

/// Like state after a like/unlike operation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LikeSummary {
    /// The photo's like count after the operation.
    pub likes: i32,
}

/// Rating state after a rate operation.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingSummary {
    /// New average rating.
    pub rating: f64,
    /// Number of ratings.
    pub rating_count: i32,
    /// The caller's own score.
    pub user_rating: i32,
}

/// Service for likes and ratings.
#[derive(Clone)]
pub struct InteractionService {
    like_repo: LikeRepository,
    rating_repo: RatingRepository,
    photo_repo: PhotoRepository,
    user_repo: UserRepository,
    id_gen: IdGenerator,
}

impl InteractionService {
    /// Create a new interaction service.
    #[must_use]
    pub const fn new(
        like_repo: LikeRepository,
        rating_repo: RatingRepository,
        photo_repo: PhotoRepository,
        user_repo: UserRepository,
    ) -> Self {
        Self {
            like_repo,
            rating_repo,
            photo_repo,
            user_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// Like a photo. At most one like per (photo, user).
    pub async fn like(&self, user_id: &str, photo_id: &str) -> AppResult<LikeSummary> {
        let photo = self.photo_repo.get_by_id(photo_id).await?;

        if self.like_repo.has_liked(photo_id, user_id).await? {
            return Err(AppError::Conflict("Already liked".to_string()));
        }

        let model = photo_like::ActiveModel {
            id: Set(self.id_gen.generate()),
            photo_id: Set(photo_id.to_string()),
            user_id: Set(user_id.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };
        self.like_repo.create(model).await?;

        self.photo_repo.increment_likes(photo_id).await?;
        self.user_repo
            .increment_likes_received(&photo.creator_id)
            .await?;

        Ok(LikeSummary {
            likes: photo.likes + 1,
        })
    }

    /// Remove a like from a photo.
    pub async fn unlike(&self, user_id: &str, photo_id: &str) -> AppResult<LikeSummary> {
        let photo = self.photo_repo.get_by_id(photo_id).await?;

        if !self
            .like_repo
            .delete_by_photo_and_user(photo_id, user_id)
            .await?
        {
            return Err(AppError::BadRequest("Not liked yet".to_string()));
        }

        self.photo_repo.decrement_likes(photo_id).await?;
        self.user_repo
            .decrement_likes_received(&photo.creator_id)
            .await?;

        Ok(LikeSummary {
            likes: (photo.likes - 1).max(0),
        })
    }

    /// Rate a photo 1-5, with upsert semantics: re-rating replaces the
    /// caller's previous score, shifting the sum without changing the
    /// count.
    pub async fn rate(&self, user_id: &str, photo_id: &str, score: i32) -> AppResult<RatingSummary> {
        if !(1..=5).contains(&score) {
            return Err(AppError::Validation(
                "Rating must be between 1 and 5".to_string(),
            ));
        }

        let photo = self.photo_repo.get_by_id(photo_id).await?;
        let existing = self
            .rating_repo
            .find_by_photo_and_user(photo_id, user_id)
            .await?;

        let (new_sum, new_count) = if let Some(existing) = existing {
            let delta = score - existing.score;

            let mut active: rating::ActiveModel = existing.into();
            active.score = Set(score);
            active.updated_at = Set(Some(chrono::Utc::now().into()));
            self.rating_repo.update(active).await?;

            self.photo_repo.apply_rating_change(photo_id, delta).await?;
            (photo.rating_sum + delta, photo.rating_count.max(1))
        } else {
            let model = rating::ActiveModel {
                id: Set(self.id_gen.generate()),
                photo_id: Set(photo_id.to_string()),
                user_id: Set(user_id.to_string()),
                score: Set(score),
                created_at: Set(chrono::Utc::now().into()),
                updated_at: Set(None),
            };
            self.rating_repo.create(model).await?;

            self.photo_repo.apply_new_rating(photo_id, score).await?;
            (photo.rating_sum + score, photo.rating_count + 1)
        };

        Ok(RatingSummary {
            rating: f64::from(new_sum) / f64::from(new_count),
            rating_count: new_count,
            user_rating: score,
        })
    }
}
