//! User service.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use photoshare_common::{AppError, AppResult, IdGenerator, Role, TokenIssuer, TokenSubject};
use photoshare_db::{
    entities::{user, user::UserRole},
    repositories::{PhotoRepository, UserRepository},
};
use sea_orm::Set;
use serde::{Deserialize, Serialize};
use validator::Validate;

/// User service for registration, login and profiles.
#[derive(Clone)]
pub struct UserService {
    user_repo: UserRepository,
    photo_repo: PhotoRepository,
    tokens: TokenIssuer,
    id_gen: IdGenerator,
}

/// Input for registering a new user.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct RegisterInput {
    #[validate(length(min = 1, max = 256))]
    pub name: String,

    #[validate(email)]
    pub email: String,

    #[validate(length(min = 8, max = 128))]
    pub password: String,

    /// Requested role; anything other than "creator" becomes consumer.
    #[serde(default)]
    pub role: Option<String>,
}

/// Input for updating a profile.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct UpdateProfileInput {
    #[validate(length(min = 1, max = 256))]
    pub name: Option<String>,

    #[validate(length(max = 2048))]
    pub bio: Option<String>,

    #[validate(url)]
    pub avatar: Option<String>,
}

/// A user as serialized to callers. Never carries the password hash.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub role: Role,
    pub avatar: String,
    pub bio: String,
    pub photos_count: i32,
    pub likes_received: i32,
    pub created_at: String,
    pub updated_at: Option<String>,
}

impl From<user::Model> for UserResponse {
    fn from(u: user::Model) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
            role: role_of(u.role),
            avatar: u.avatar,
            bio: u.bio,
            photos_count: u.photos_count,
            likes_received: u.likes_received,
            created_at: u.created_at.to_rfc3339(),
            updated_at: u.updated_at.map(|t| t.to_rfc3339()),
        }
    }
}

/// An issued session: the sanitized user plus a bearer token.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub token: String,
    pub user: UserResponse,
}

const fn role_of(role: UserRole) -> Role {
    match role {
        UserRole::Creator => Role::Creator,
        UserRole::Consumer => Role::Consumer,
    }
}

const fn db_role(role: Role) -> UserRole {
    match role {
        Role::Creator => UserRole::Creator,
        Role::Consumer => UserRole::Consumer,
    }
}

/// Default avatar for users who have not set one.
pub(crate) fn generated_avatar(name: &str) -> String {
    format!(
        "https://ui-avatars.com/api/?name={}&background=6366f1&color=fff",
        urlencoding::encode(name)
    )
}

impl UserService {
    /// Create a new user service.
    #[must_use]
    pub const fn new(
        user_repo: UserRepository,
        photo_repo: PhotoRepository,
        tokens: TokenIssuer,
    ) -> Self {
        Self {
            user_repo,
            photo_repo,
            tokens,
            id_gen: IdGenerator::new(),
        }
    }

    /// Register a new user and issue a session token.
    pub async fn register(&self, input: RegisterInput) -> AppResult<Session> {
        input.validate()?;

        // Check if email is taken (emails are case-insensitive)
        if self.user_repo.find_by_email(&input.email).await?.is_some() {
            return Err(AppError::BadRequest("Email already registered".to_string()));
        }

        let password_hash = hash_password(&input.password)?;
        let role = Role::parse_or_default(input.role.as_deref());
        let user_id = self.id_gen.generate();
        let now = chrono::Utc::now();

        let model = user::ActiveModel {
            id: Set(user_id),
            name: Set(input.name.clone()),
            email: Set(input.email.to_lowercase()),
            password_hash: Set(password_hash),
            role: Set(db_role(role)),
            avatar: Set(generated_avatar(&input.name)),
            bio: Set(String::new()),
            photos_count: Set(0),
            likes_received: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(None),
        };

        let user = self.user_repo.create(model).await?;
        self.issue_session(user)
    }

    /// Authenticate by email and password and issue a session token.
    ///
    /// Unknown emails and wrong passwords are indistinguishable to callers.
    pub async fn login(&self, email: &str, password: &str) -> AppResult<Session> {
        let user = self
            .user_repo
            .find_by_email(email)
            .await?
            .ok_or(AppError::Unauthorized)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AppError::Unauthorized);
        }

        self.issue_session(user)
    }

    /// Get a user's fresh profile.
    pub async fn get_profile(&self, user_id: &str) -> AppResult<UserResponse> {
        Ok(self.user_repo.get_by_id(user_id).await?.into())
    }

    /// Update a user's profile.
    ///
    /// A changed name or avatar is propagated to the cached creator
    /// snapshots on that user's photos; this is the only time the snapshots
    /// are refreshed.
    pub async fn update_profile(
        &self,
        user_id: &str,
        input: UpdateProfileInput,
    ) -> AppResult<UserResponse> {
        input.validate()?;

        let user = self.user_repo.get_by_id(user_id).await?;
        let snapshot_stale = input.name.is_some() || input.avatar.is_some();
        let mut active: user::ActiveModel = user.into();

        if let Some(name) = input.name {
            active.name = Set(name);
        }
        if let Some(bio) = input.bio {
            active.bio = Set(bio);
        }
        if let Some(avatar) = input.avatar {
            active.avatar = Set(avatar);
        }
        active.updated_at = Set(Some(chrono::Utc::now().into()));

        let updated = self.user_repo.update(active).await?;

        if snapshot_stale {
            self.photo_repo
                .refresh_creator_snapshot(&updated.id, &updated.name, &updated.avatar)
                .await?;
        }

        Ok(updated.into())
    }

    fn issue_session(&self, user: user::Model) -> AppResult<Session> {
        let token = self.tokens.issue(&TokenSubject {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            role: role_of(user.role),
            avatar: Some(user.avatar.clone()),
        })?;

        Ok(Session {
            token,
            user: user.into(),
        })
    }
}

/// Hash a password using Argon2.
fn hash_password(password: &str) -> AppResult<String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| AppError::Internal(format!("Failed to hash password: {e}")))
}

/// Verify a password against a hash.
fn verify_password(password: &str, hash: &str) -> AppResult<bool> {
    let parsed_hash =
        PasswordHash::new(hash).map_err(|e| AppError::Internal(format!("Invalid hash: {e}")))?;

    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sea_orm::{DatabaseBackend, MockDatabase};
    use std::sync::Arc;

    fn create_test_user(id: &str, role: UserRole) -> user::Model {
        user::Model {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: format!("{id}@example.com"),
            password_hash: hash_password("password123").unwrap(),
            role,
            avatar: generated_avatar("Test User"),
            bio: String::new(),
            photos_count: 0,
            likes_received: 0,
            created_at: Utc::now().into(),
            updated_at: None,
        }
    }

    fn create_test_service(
        user_db: Arc<sea_orm::DatabaseConnection>,
        photo_db: Arc<sea_orm::DatabaseConnection>,
    ) -> UserService {
        UserService::new(
            UserRepository::new(user_db),
            PhotoRepository::new(photo_db),
            TokenIssuer::new("test-secret", 3600),
        )
    }

    // Unit tests for password functions
    #[test]
    fn test_hash_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(hash.starts_with("$argon2"));
    }

    #[test]
    fn test_verify_password() {
        let hash = hash_password("test_password_123").unwrap();
        assert!(verify_password("test_password_123", &hash).unwrap());
        assert!(!verify_password("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_hash_password_different_each_time() {
        let hash1 = hash_password("same_password").unwrap();
        let hash2 = hash_password("same_password").unwrap();

        // Different salts should produce different hashes
        assert_ne!(hash1, hash2);
        assert!(verify_password("same_password", &hash1).unwrap());
        assert!(verify_password("same_password", &hash2).unwrap());
    }

    #[test]
    fn test_generated_avatar_encodes_name() {
        let url = generated_avatar("Ada Lovelace");
        assert!(url.contains("Ada%20Lovelace"));
    }

    #[test]
    fn test_register_input_validation() {
        let input = RegisterInput {
            name: String::new(),
            email: "a@example.com".to_string(),
            password: "password123".to_string(),
            role: None,
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            name: "Alice".to_string(),
            email: "not-an-email".to_string(),
            password: "password123".to_string(),
            role: None,
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            name: "Alice".to_string(),
            email: "a@example.com".to_string(),
            password: "short".to_string(),
            role: Some("creator".to_string()),
        };
        assert!(input.validate().is_err());

        let input = RegisterInput {
            name: "Alice".to_string(),
            email: "a@example.com".to_string(),
            password: "password123".to_string(),
            role: Some("creator".to_string()),
        };
        assert!(input.validate().is_ok());
    }

    // Service tests
    #[tokio::test]
    async fn test_register_rejects_duplicate_email() {
        let existing = create_test_user("user1", UserRole::Consumer);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[existing]])
                .into_connection(),
        );
        let photo_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, photo_db);
        let result = service
            .register(RegisterInput {
                name: "Alice".to_string(),
                email: "USER1@example.com".to_string(),
                password: "password123".to_string(),
                role: None,
            })
            .await;

        match result {
            Err(AppError::BadRequest(msg)) => assert!(msg.contains("already registered")),
            other => panic!("Expected BadRequest, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_login_unknown_email_is_unauthorized() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let photo_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, photo_db);
        let result = service.login("nobody@example.com", "password123").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_wrong_password_is_unauthorized() {
        let user = create_test_user("user1", UserRole::Consumer);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let photo_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, photo_db);
        let result = service.login("user1@example.com", "wrong_password").await;

        assert!(matches!(result, Err(AppError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let user = create_test_user("user1", UserRole::Creator);
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[user]])
                .into_connection(),
        );
        let photo_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, photo_db);
        let session = service
            .login("user1@example.com", "password123")
            .await
            .unwrap();

        assert_eq!(session.user.id, "user1");
        assert_eq!(session.user.role, Role::Creator);

        let verified = TokenIssuer::new("test-secret", 3600)
            .verify(&session.token)
            .unwrap();
        assert_eq!(verified.id, "user1");
        assert!(verified.is_creator());
    }

    #[tokio::test]
    async fn test_get_profile_not_found() {
        let user_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<user::Model>::new()])
                .into_connection(),
        );
        let photo_db = Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection());

        let service = create_test_service(user_db, photo_db);
        let result = service.get_profile("nonexistent").await;

        match result {
            Err(AppError::UserNotFound(id)) => assert_eq!(id, "nonexistent"),
            other => panic!("Expected UserNotFound, got {other:?}"),
        }
    }
}
