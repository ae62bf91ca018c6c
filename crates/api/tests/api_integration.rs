//! API integration tests.
//!
//! These tests drive the router over mock database connections and verify
//! the HTTP surface: envelope shape, status codes, auth behavior and the
//! lenient listing parameters.

#![allow(clippy::unwrap_used, clippy::expect_used)]

use axum::{
    Router, middleware,
    body::Body,
    http::{Request, StatusCode},
};
use chrono::Utc;
use photoshare_api::middleware::{AppState, auth_middleware};
use photoshare_api::router as api_router;
use photoshare_common::{
    NoOpStorage, Role, SignedUrlIssuer, TokenIssuer, TokenSubject,
};
use photoshare_core::{
    CommentService, InteractionService, PhotoService, UserService,
};
use photoshare_db::entities::photo::{self, ModerationStatus};
use photoshare_db::entities::user::{self, UserRole};
use photoshare_db::repositories::{
    CommentRepository, LikeRepository, PhotoRepository, RatingRepository, UserRepository,
};
use sea_orm::{DatabaseBackend, DatabaseConnection, MockDatabase, MockExecResult};
use serde_json::{Value, json};
use std::sync::Arc;
use tower::ServiceExt;

fn empty_mock() -> Arc<DatabaseConnection> {
    Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
}

struct MockDbs {
    photo: Arc<DatabaseConnection>,
    like: Arc<DatabaseConnection>,
    rating: Arc<DatabaseConnection>,
    user: Arc<DatabaseConnection>,
    comment: Arc<DatabaseConnection>,
}

impl Default for MockDbs {
    fn default() -> Self {
        Self {
            photo: empty_mock(),
            like: empty_mock(),
            rating: empty_mock(),
            user: empty_mock(),
            comment: empty_mock(),
        }
    }
}

fn tokens() -> TokenIssuer {
    TokenIssuer::new("test-secret", 3600)
}

fn build_app(dbs: MockDbs) -> Router {
    let storage: photoshare_common::StorageService =
        Arc::new(NoOpStorage::new("https://cdn.example.com".to_string()));
    let urls = SignedUrlIssuer::new("account-key", 3600);

    let photo_repo = PhotoRepository::new(Arc::clone(&dbs.photo));
    let like_repo = LikeRepository::new(Arc::clone(&dbs.like));
    let rating_repo = RatingRepository::new(Arc::clone(&dbs.rating));
    let user_repo = UserRepository::new(Arc::clone(&dbs.user));
    let comment_repo = CommentRepository::new(Arc::clone(&dbs.comment));

    let state = AppState {
        user_service: UserService::new(user_repo.clone(), photo_repo.clone(), tokens()),
        photo_service: PhotoService::new(
            photo_repo.clone(),
            like_repo.clone(),
            rating_repo.clone(),
            user_repo.clone(),
            Arc::clone(&storage),
            urls.clone(),
            None,
        ),
        interaction_service: InteractionService::new(
            like_repo,
            rating_repo,
            photo_repo.clone(),
            user_repo,
        ),
        comment_service: CommentService::new(comment_repo, photo_repo),
        tokens: tokens(),
        storage,
        urls,
    };

    Router::new()
        .nest("/api", api_router())
        .layer(middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ))
        .with_state(state)
}

fn test_photo(id: &str) -> photo::Model {
    photo::Model {
        id: id.to_string(),
        creator_id: "creator1".to_string(),
        creator_name: "Creator".to_string(),
        creator_avatar: "https://example.com/a.png".to_string(),
        title: "Sunset Glow".to_string(),
        caption: String::new(),
        location: String::new(),
        people: json!([]),
        tags: json!(["sky"]),
        category: "sky".to_string(),
        blob_name: format!("{id}.jpg"),
        image_url: format!("https://cdn.example.com/blobs/{id}.jpg"),
        ai_description: None,
        status: ModerationStatus::Approved,
        likes: 0,
        rating_sum: 0,
        rating_count: 0,
        rating: 0.0,
        comments: 0,
        views: 0,
        created_at: Utc::now().into(),
        updated_at: Utc::now().into(),
    }
}

fn test_user(id: &str) -> user::Model {
    user::Model {
        id: id.to_string(),
        name: "Test User".to_string(),
        email: format!("{id}@example.com"),
        password_hash: "$argon2id$test".to_string(),
        role: UserRole::Consumer,
        avatar: "https://example.com/a.png".to_string(),
        bio: String::new(),
        photos_count: 0,
        likes_received: 0,
        created_at: Utc::now().into(),
        updated_at: None,
    }
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_list_photos_envelope() {
    let dbs = MockDbs {
        photo: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_photo("p1"), test_photo("p2")]])
                .append_query_results([[maplit_count(2)]])
                .into_connection(),
        ),
        ..MockDbs::default()
    };
    let app = build_app(dbs);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/photos?page=1&limit=12")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(body["data"].as_array().unwrap().len(), 2);
    assert_eq!(body["pagination"]["total"], 2);
    assert_eq!(body["pagination"]["totalPages"], 1);
    assert_eq!(body["pagination"]["hasMore"], false);

    // Asset URLs are tokenized, blob names are not exposed
    let first = &body["data"][0];
    assert!(first["imageUrl"].as_str().unwrap().contains("sig="));
    assert!(first.get("blobName").is_none());
    assert_eq!(first["userLiked"], false);
    assert_eq!(first["userRating"], 0);
}

#[tokio::test]
async fn test_list_photos_tolerates_malformed_params() {
    let dbs = MockDbs {
        photo: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<photo::Model>::new()])
                .append_query_results([[maplit_count(0)]])
                .into_connection(),
        ),
        ..MockDbs::default()
    };
    let app = build_app(dbs);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/photos?page=abc&limit=-5&sort=bogus")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Malformed pagination parameters are defaulted, never rejected
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["pagination"]["page"], 1);
    assert_eq!(body["pagination"]["limit"], 12);
}

#[tokio::test]
async fn test_get_photo_not_found() {
    let dbs = MockDbs {
        photo: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<photo::Model>::new()])
                .into_connection(),
        ),
        ..MockDbs::default()
    };
    let app = build_app(dbs);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/photos/missing")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "PHOTO_NOT_FOUND");
}

#[tokio::test]
async fn test_anonymous_get_photo_increments_views() {
    let dbs = MockDbs {
        photo: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_photo("p1")]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        ),
        ..MockDbs::default()
    };
    let app = build_app(dbs);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/photos/p1")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["views"], 1);
    assert_eq!(body["data"]["userLiked"], false);
    assert_eq!(body["data"]["userRating"], 0);
}

#[tokio::test]
async fn test_upload_requires_authentication() {
    let app = build_app(MockDbs::default());

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/photos")
                .header("content-type", "multipart/form-data; boundary=x")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_profile_with_bearer_token() {
    let dbs = MockDbs {
        user: Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_user("user1")]])
                .into_connection(),
        ),
        ..MockDbs::default()
    };
    let app = build_app(dbs);

    let token = tokens()
        .issue(&TokenSubject {
            id: "user1".to_string(),
            name: "Test User".to_string(),
            email: "user1@example.com".to_string(),
            role: Role::Consumer,
            avatar: None,
        })
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .header("Authorization", format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["data"]["id"], "user1");
    // The password hash never leaves the server
    assert!(body["data"].get("passwordHash").is_none());
}

#[tokio::test]
async fn test_profile_with_garbage_token_is_anonymous() {
    let app = build_app(MockDbs::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/auth/profile")
                .header("Authorization", "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    // Verification fails closed: the request is anonymous, and the profile
    // endpoint rejects anonymous callers
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_search_requires_query() {
    let app = build_app(MockDbs::default());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/search")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

fn maplit_count(n: i64) -> std::collections::BTreeMap<&'static str, sea_orm::Value> {
    let mut row = std::collections::BTreeMap::new();
    row.insert("num_items", sea_orm::Value::BigInt(Some(n)));
    row
}
