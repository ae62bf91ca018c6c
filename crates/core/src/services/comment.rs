//! Comment service.

use photoshare_common::{AppError, AppResult, AuthenticatedUser, IdGenerator};
use photoshare_db::entities::comment;
use photoshare_db::repositories::{CommentRepository, PhotoRepository};
use sea_orm::Set;
use serde::Serialize;

use crate::services::user::generated_avatar;

/// Maximum comment length in characters.
const MAX_COMMENT_LEN: usize = 2048;

/// Comment author snapshot.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentAuthor {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

/// A comment as serialized to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentResponse {
    pub id: String,
    pub photo_id: String,
    pub user: CommentAuthor,
    pub text: String,
    pub created_at: String,
}

impl From<comment::Model> for CommentResponse {
    fn from(c: comment::Model) -> Self {
        Self {
            id: c.id,
            photo_id: c.photo_id,
            user: CommentAuthor {
                id: c.user_id,
                name: c.user_name,
                avatar: c.user_avatar,
            },
            text: c.text,
            created_at: c.created_at.to_rfc3339(),
        }
    }
}

/// Service for photo comments.
#[derive(Clone)]
pub struct CommentService {
    comment_repo: CommentRepository,
    photo_repo: PhotoRepository,
    id_gen: IdGenerator,
}

impl CommentService {
    /// Create a new comment service.
    #[must_use]
    pub const fn new(comment_repo: CommentRepository, photo_repo: PhotoRepository) -> Self {
        Self {
            comment_repo,
            photo_repo,
            id_gen: IdGenerator::new(),
        }
    }

    /// List a photo's comments, newest first.
    pub async fn list(&self, photo_id: &str) -> AppResult<Vec<CommentResponse>> {
        let comments = self.comment_repo.find_by_photo(photo_id).await?;
        Ok(comments.into_iter().map(Into::into).collect())
    }

    /// Add a comment to a photo.
    pub async fn add(
        &self,
        author: &AuthenticatedUser,
        photo_id: &str,
        text: &str,
    ) -> AppResult<CommentResponse> {
        let text = text.trim();
        if text.is_empty() {
            return Err(AppError::Validation(
                "Comment text is required".to_string(),
            ));
        }
        if text.len() > MAX_COMMENT_LEN {
            return Err(AppError::Validation(format!(
                "Comment must be at most {MAX_COMMENT_LEN} characters"
            )));
        }

        // Verify the photo exists before attaching anything to it
        self.photo_repo.get_by_id(photo_id).await?;

        let avatar = author
            .avatar
            .clone()
            .unwrap_or_else(|| generated_avatar(&author.name));

        let model = comment::ActiveModel {
            id: Set(self.id_gen.generate()),
            photo_id: Set(photo_id.to_string()),
            user_id: Set(author.id.clone()),
            user_name: Set(author.name.clone()),
            user_avatar: Set(avatar),
            text: Set(text.to_string()),
            created_at: Set(chrono::Utc::now().into()),
        };

        let created = self.comment_repo.create(model).await?;
        self.photo_repo.increment_comments(photo_id).await?;

        Ok(created.into())
    }

    /// Delete a comment. Author only; the photo's comment count is
    /// decremented, floored at zero.
    pub async fn delete(&self, user_id: &str, photo_id: &str, comment_id: &str) -> AppResult<()> {
        let comment = self.comment_repo.get_by_id(comment_id).await?;

        if comment.user_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to delete this comment".to_string(),
            ));
        }

        self.comment_repo.delete(comment_id).await?;
        self.photo_repo.decrement_comments(photo_id).await?;
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use photoshare_common::Role;
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn author(id: &str) -> AuthenticatedUser {
        AuthenticatedUser {
            id: id.to_string(),
            name: "Commenter".to_string(),
            email: format!("{id}@example.com"),
            role: Role::Consumer,
            avatar: None,
        }
    }

    fn test_comment(id: &str, user_id: &str) -> comment::Model {
        comment::Model {
            id: id.to_string(),
            photo_id: "p1".to_string(),
            user_id: user_id.to_string(),
            user_name: "Commenter".to_string(),
            user_avatar: "https://example.com/a.png".to_string(),
            text: "Nice shot".to_string(),
            created_at: Utc::now().into(),
        }
    }

    fn empty_mock() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[tokio::test]
    async fn test_add_rejects_blank_text() {
        let service = CommentService::new(
            CommentRepository::new(empty_mock()),
            PhotoRepository::new(empty_mock()),
        );

        let result = service.add(&author("user1"), "p1", "   ").await;
        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_author_is_forbidden() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_comment("c1", "someone-else")]])
                .into_connection(),
        );
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PhotoRepository::new(empty_mock()),
        );

        let result = service.delete("user1", "p1", "c1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_author_decrements_count() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_comment("c1", "user1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PhotoRepository::new(photo_db),
        );

        assert!(service.delete("user1", "p1", "c1").await.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_comment_is_not_found() {
        let comment_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<comment::Model>::new()])
                .into_connection(),
        );
        let service = CommentService::new(
            CommentRepository::new(comment_db),
            PhotoRepository::new(empty_mock()),
        );

        let result = service.delete("user1", "p1", "missing").await;
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }
}
