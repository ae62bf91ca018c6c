//! Rating repository.

use std::sync::Arc;

use crate::entities::{Rating, rating};
use photoshare_common::{AppError, AppResult};
use sea_orm::{ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter};

/// Rating repository for database operations.
#[derive(Clone)]
pub struct RatingRepository {
    db: Arc<DatabaseConnection>,
}

impl RatingRepository {
    /// Create a new rating repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user's rating for a photo.
    pub async fn find_by_photo_and_user(
        &self,
        photo_id: &str,
        user_id: &str,
    ) -> AppResult<Option<rating::Model>> {
        Rating::find()
            .filter(rating::Column::PhotoId.eq(photo_id))
            .filter(rating::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a rating.
    pub async fn create(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a rating.
    pub async fn update(&self, model: rating::ActiveModel) -> AppResult<rating::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Find a user's ratings among the given photos, in one query.
    pub async fn find_among(
        &self,
        user_id: &str,
        photo_ids: &[String],
    ) -> AppResult<Vec<rating::Model>> {
        if photo_ids.is_empty() {
            return Ok(Vec::new());
        }

        Rating::find()
            .filter(rating::Column::UserId.eq(user_id))
            .filter(rating::Column::PhotoId.is_in(photo_ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
