//! Photo like repository.

use std::sync::Arc;

use crate::entities::{PhotoLike, photo_like};
use photoshare_common::{AppError, AppResult};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// Like repository for database operations.
#[derive(Clone)]
pub struct LikeRepository {
    db: Arc<DatabaseConnection>,
}

impl LikeRepository {
    /// Create a new like repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a like by photo and user.
    pub async fn find_by_photo_and_user(
        &self,
        photo_id: &str,
        user_id: &str,
    ) -> AppResult<Option<photo_like::Model>> {
        PhotoLike::find()
            .filter(photo_like::Column::PhotoId.eq(photo_id))
            .filter(photo_like::Column::UserId.eq(user_id))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Check if a user has liked a photo.
    pub async fn has_liked(&self, photo_id: &str, user_id: &str) -> AppResult<bool> {
        let count = PhotoLike::find()
            .filter(photo_like::Column::PhotoId.eq(photo_id))
            .filter(photo_like::Column::UserId.eq(user_id))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(count > 0)
    }

    /// Create a like.
    pub async fn create(&self, model: photo_like::ActiveModel) -> AppResult<photo_like::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a like by photo and user. Returns whether a row was removed.
    pub async fn delete_by_photo_and_user(
        &self,
        photo_id: &str,
        user_id: &str,
    ) -> AppResult<bool> {
        let deleted = PhotoLike::delete_many()
            .filter(photo_like::Column::PhotoId.eq(photo_id))
            .filter(photo_like::Column::UserId.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(deleted.rows_affected > 0)
    }

    /// Find which of the given photos a user has liked, in one query.
    pub async fn find_liked_among(
        &self,
        user_id: &str,
        photo_ids: &[String],
    ) -> AppResult<Vec<photo_like::Model>> {
        if photo_ids.is_empty() {
            return Ok(Vec::new());
        }

        PhotoLike::find()
            .filter(photo_like::Column::UserId.eq(user_id))
            .filter(photo_like::Column::PhotoId.is_in(photo_ids.iter().map(String::as_str)))
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }
}
