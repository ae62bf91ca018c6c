//! User repository.

use std::sync::Arc;

use crate::entities::{User, user};
use photoshare_common::{AppError, AppResult};
use sea_orm::sea_query::Expr;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
};

/// User repository for database operations.
#[derive(Clone)]
pub struct UserRepository {
    db: Arc<DatabaseConnection>,
}

impl UserRepository {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: Arc<DatabaseConnection>) -> Self {
        Self { db }
    }

    /// Find a user by ID.
    pub async fn find_by_id(&self, id: &str) -> AppResult<Option<user::Model>> {
        User::find_by_id(id)
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Get a user by ID, returning an error if not found.
    pub async fn get_by_id(&self, id: &str) -> AppResult<user::Model> {
        self.find_by_id(id)
            .await?
            .ok_or_else(|| AppError::UserNotFound(id.to_string()))
    }

    /// Find a user by email. Emails are stored lowercase; the lookup
    /// lowercases its argument to stay case-insensitive.
    pub async fn find_by_email(&self, email: &str) -> AppResult<Option<user::Model>> {
        User::find()
            .filter(user::Column::Email.eq(email.to_lowercase()))
            .one(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Create a new user.
    pub async fn create(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .insert(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Update a user.
    pub async fn update(&self, model: user::ActiveModel) -> AppResult<user::Model> {
        model
            .update(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Count users with the creator role.
    pub async fn count_creators(&self) -> AppResult<u64> {
        User::find()
            .filter(user::Column::Role.eq(user::UserRole::Creator))
            .count(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))
    }

    /// Increment a user's photo count.
    pub async fn increment_photos_count(&self, user_id: &str) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::PhotosCount,
                Expr::col(user::Column::PhotosCount).add(1),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement a user's photo count, floored at zero.
    pub async fn decrement_photos_count(&self, user_id: &str) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::PhotosCount,
                Expr::cust("GREATEST(photos_count - 1, 0)"),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Increment a user's received-likes count.
    pub async fn increment_likes_received(&self, user_id: &str) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::LikesReceived,
                Expr::col(user::Column::LikesReceived).add(1),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }

    /// Decrement a user's received-likes count, floored at zero.
    pub async fn decrement_likes_received(&self, user_id: &str) -> AppResult<()> {
        User::update_many()
            .col_expr(
                user::Column::LikesReceived,
                Expr::cust("GREATEST(likes_received - 1, 0)"),
            )
            .filter(user::Column::Id.eq(user_id))
            .exec(self.db.as_ref())
            .await
            .map_err(|e| AppError::Database(e.to_string()))?;
        Ok(())
    }
}
