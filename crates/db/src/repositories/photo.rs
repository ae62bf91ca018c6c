//! Photo repository.

use std::sync::Arc;

use crate::entities::{Photo, photo};
use crate::query::{PhotoQuery, PhotoSort, discovery_condition};
use photoshare_common::{AppError, AppResult};
use sea_orm::sea_query::{Alias, Expr, ExprTrait};
use sea_orm::{
    ActiveModelTrait, ColumnTrait, Condition, DatabaseConnection, EntityTrait, PaginatorTrait,
    QueryFilter, QueryOrder, QuerySelect,
};

/// Photo repository for database operations.
#[derive(Clone)]
pub struct PhotoRepository {
    db: Arc<DatabaseConnection>,
}

impl PhotoRepository {
    /// Create a new photo repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a photo by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<photo::Model>> {
        Photo::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a photo by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<photo::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::PhotoNotFound(id.to_string()))
    }

    /// Execute a listing query, returning one ordered page.
    pub async fn list(&self, query: &PhotoQuery) -> AppResult<Vec<photo::Model>> {
        let select = Photo::find().filter(query.condition());

        let select = match query.sort {
            PhotoSort::Newest => select.order_by_desc(photo::Column::CreatedAt),
            PhotoSort::Oldest => select.order_by_asc(photo::Column::CreatedAt),
            PhotoSort::Popular => select
                .order_by_desc(photo::Column::Likes)
                .order_by_desc(photo::Column::CreatedAt),
            PhotoSort::TopRated => select
                .order_by_desc(photo::Column::Rating)
                .order_by_desc(photo::Column::CreatedAt),
        };

        select
            .offset(query.page.offset())
            .limit(query.page.limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count all photos matching a listing query's predicates.
    pub async fn count(&self, query: &PhotoQuery) -> AppResult<u64> {
        Photo::find()
            .filter(query.condition())
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Free-text discovery search over approved photos, newest first.
    pub async fn search(&self, term: &str, limit: u64) -> AppResult<Vec<photo::Model>> {
        Photo::find()
            .filter(
                Condition::all()
                    .add(photo::Column::Status.eq(photo::ModerationStatus::Approved))
                    .add(discovery_condition(term)),
            )
            .order_by_desc(photo::Column::CreatedAt)
            .limit(limit)
            .all(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new photo.
    pub async fn create(&self, model: photo::ActiveModel) -> AppResult<photo::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a photo.
    pub async fn update(&self, model: photo::ActiveModel) -> AppResult<photo::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Delete a photo. Likes, ratings and comments cascade at the schema
    /// level.
    pub async fn delete(&self, id: &str) -> AppResult<()> {
        Photo::delete_by_id(id)
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment a photo's view count.
    pub async fn increment_views(&self, id: &str) -> AppResult<()> {
        Photo::update_many()
            .col_expr(photo::Column::Views, Expr::col(photo::Column::Views).add(1))
            .filter(photo::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment a photo's like count.
    pub async fn increment_likes(&self, id: &str) -> AppResult<()> {
        Photo::update_many()
            .col_expr(photo::Column::Likes, Expr::col(photo::Column::Likes).add(1))
            .col_expr(photo::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(photo::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement a photo's like count, floored at zero.
    pub async fn decrement_likes(&self, id: &str) -> AppResult<()> {
        Photo::update_many()
            .col_expr(photo::Column::Likes, Expr::cust("GREATEST(likes - 1, 0)"))
            .col_expr(photo::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(photo::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment a photo's comment count.
    pub async fn increment_comments(&self, id: &str) -> AppResult<()> {
        Photo::update_many()
            .col_expr(
                photo::Column::Comments,
                Expr::col(photo::Column::Comments).add(1),
            )
            .filter(photo::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement a photo's comment count, floored at zero.
    pub async fn decrement_comments(&self, id: &str) -> AppResult<()> {
        Photo::update_many()
            .col_expr(
                photo::Column::Comments,
                Expr::cust("GREATEST(comments - 1, 0)"),
            )
            .filter(photo::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Record a first-time rating: bump the sum and count and recompute the
    /// average, all in one statement.
    pub async fn apply_new_rating(&self, id: &str, score: i32) -> AppResult<()> {
        Photo::update_many()
            .col_expr(
                photo::Column::RatingSum,
                Expr::col(photo::Column::RatingSum).add(score),
            )
            .col_expr(
                photo::Column::RatingCount,
                Expr::col(photo::Column::RatingCount).add(1),
            )
            .col_expr(
                photo::Column::Rating,
                Expr::cust(format!(
                    "(rating_sum + {score})::double precision / (rating_count + 1)"
                )),
            )
            .col_expr(photo::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(photo::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Record a replaced rating: shift the sum by the score delta and
    /// recompute the average. The count is unchanged and is at least one,
    /// since an existing rating is being replaced.
    pub async fn apply_rating_change(&self, id: &str, delta: i32) -> AppResult<()> {
        Photo::update_many()
            .col_expr(
                photo::Column::RatingSum,
                Expr::col(photo::Column::RatingSum).add(delta),
            )
            .col_expr(
                photo::Column::Rating,
                Expr::cust(format!(
                    "(rating_sum + {delta})::double precision / GREATEST(rating_count, 1)"
                )),
            )
            .col_expr(photo::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(photo::Column::Id.eq(id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Refresh the cached creator snapshot on all of a creator's photos.
    /// Called only when a profile edit propagates.
    pub async fn refresh_creator_snapshot(
        &self,
        creator_id: &str,
        name: &str,
        avatar: &str,
    ) -> AppResult<()> {
        Photo::update_many()
            .col_expr(photo::Column::CreatorName, Expr::value(name))
            .col_expr(photo::Column::CreatorAvatar, Expr::value(avatar))
            .filter(photo::Column::CreatorId.eq(creator_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Count approved photos.
    pub async fn count_approved(&self) -> AppResult<u64> {
        Photo::find()
            .filter(photo::Column::Status.eq(photo::ModerationStatus::Approved))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Sum of view counts across all photos.
    pub async fn total_views(&self) -> AppResult<i64> {
        let total: Option<Option<i64>> = Photo::find()
            .select_only()
            .column_as(
                Expr::col(photo::Column::Views)
                    .sum()
                    .cast_as(Alias::new("bigint")),
                "total",
            )
            .into_tuple()
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;

        Ok(total.flatten().unwrap_or(0))
    }
}
