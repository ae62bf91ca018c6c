//! Photo service: upload, listing, retrieval, editing and deletion.

use photoshare_common::{
    AppError, AppResult, AuthenticatedUser, IdGenerator, SignedUrlIssuer, StorageService,
};
use photoshare_db::entities::photo::{self, ModerationStatus};
use photoshare_db::query::{PageRequest, PhotoQuery, PhotoSort};
use photoshare_db::repositories::{LikeRepository, PhotoRepository, RatingRepository, UserRepository};
use sea_orm::Set;
use serde::Serialize;
use serde_json::json;
use std::collections::{HashMap, HashSet};

use crate::services::user::generated_avatar;
use crate::services::vision::VisionService;

/// Maximum upload size in bytes.
pub const MAX_UPLOAD_BYTES: usize = 32 * 1024 * 1024;

/// Maximum number of tags per photo.
const MAX_TAGS_PER_PHOTO: usize = 32;

/// Maximum number of tagged people per photo.
const MAX_PEOPLE_PER_PHOTO: usize = 32;

/// Result cap for the discovery search endpoint.
const SEARCH_RESULT_LIMIT: u64 = 50;

/// Input for uploading a photo.
#[derive(Debug)]
pub struct UploadPhotoInput {
    /// Photo title (required).
    pub title: String,
    /// Caption text.
    pub caption: String,
    /// Free-form location.
    pub location: String,
    /// Tagged people.
    pub people: Vec<String>,
    /// User-supplied tags.
    pub tags: Vec<String>,
    /// Whether to merge AI-generated tags.
    pub auto_tags: bool,
    /// Whether to run content moderation.
    pub content_moderation: bool,
    /// Original file name, used for the blob extension.
    pub file_name: String,
    /// MIME content type.
    pub content_type: String,
    /// Raw image bytes.
    pub data: Vec<u8>,
}

/// Input for editing a photo.
#[derive(Debug, Default, serde::Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePhotoInput {
    pub title: Option<String>,
    pub caption: Option<String>,
    pub location: Option<String>,
    pub people: Option<Vec<String>>,
    pub tags: Option<Vec<String>>,
}

/// Listing parameters, already defaulted by the caller.
#[derive(Debug, Clone)]
pub struct ListPhotosInput {
    /// 1-based page number.
    pub page: u64,
    /// Page size.
    pub limit: u64,
    /// Category filter; "all" disables it.
    pub filter: String,
    /// Sort keyword.
    pub sort: String,
    /// Search term; empty disables it.
    pub search: String,
    /// Scope to one creator's photos.
    pub creator_id: Option<String>,
}

impl Default for ListPhotosInput {
    fn default() -> Self {
        Self {
            page: 1,
            limit: photoshare_db::query::DEFAULT_PAGE_SIZE,
            filter: "all".to_string(),
            sort: "newest".to_string(),
            search: String::new(),
            creator_id: None,
        }
    }
}

/// Cached creator projection embedded in photo responses.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatorInfo {
    pub id: String,
    pub name: String,
    pub avatar: String,
}

/// A photo as serialized to callers.
///
/// `image_url` always carries an access token when the stored URL lacked
/// one; the raw blob name is never exposed.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoResponse {
    pub id: String,
    pub title: String,
    pub caption: String,
    pub image_url: String,
    pub location: String,
    pub people: Vec<String>,
    pub tags: Vec<String>,
    pub category: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_description: Option<String>,
    pub status: ModerationStatus,
    pub creator_id: String,
    pub creator: CreatorInfo,
    pub likes: i32,
    pub rating: f64,
    pub rating_count: i32,
    pub comments: i32,
    pub views: i32,
    pub created_at: String,
    pub updated_at: String,
    /// Whether the caller has liked this photo (false for anonymous).
    pub user_liked: bool,
    /// The caller's own rating, 0 when absent or anonymous.
    pub user_rating: i32,
}

/// Pagination metadata for a listing page.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub page: u64,
    pub limit: u64,
    pub total: u64,
    pub total_pages: u64,
    pub has_more: bool,
}

/// One page of photos plus pagination metadata.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PhotoPage {
    pub items: Vec<PhotoResponse>,
    pub pagination: PageInfo,
}

/// Platform statistics.
#[derive(Debug, Clone, Copy, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformStats {
    pub photos: u64,
    pub creators: u64,
    pub views: i64,
}

/// Photo service.
#[derive(Clone)]
pub struct PhotoService {
    photo_repo: PhotoRepository,
    like_repo: LikeRepository,
    rating_repo: RatingRepository,
    user_repo: UserRepository,
    storage: StorageService,
    urls: SignedUrlIssuer,
    vision: Option<VisionService>,
    id_gen: IdGenerator,
}

impl PhotoService {
    /// Create a new photo service.
    #[must_use]
    pub const fn new(
        photo_repo: PhotoRepository,
        like_repo: LikeRepository,
        rating_repo: RatingRepository,
        user_repo: UserRepository,
        storage: StorageService,
        urls: SignedUrlIssuer,
        vision: Option<VisionService>,
    ) -> Self {
        Self {
            photo_repo,
            like_repo,
            rating_repo,
            user_repo,
            storage,
            urls,
            vision,
            id_gen: IdGenerator::new(),
        }
    }

    /// Upload a new photo. Creator role required.
    pub async fn upload(
        &self,
        creator: &AuthenticatedUser,
        input: UploadPhotoInput,
    ) -> AppResult<PhotoResponse> {
        if !creator.is_creator() {
            return Err(AppError::Forbidden(
                "Only creators can upload photos".to_string(),
            ));
        }

        let title = input.title.trim().to_string();
        if title.is_empty() || title.len() > 256 {
            return Err(AppError::Validation(
                "Title must be between 1 and 256 characters".to_string(),
            ));
        }
        if input.data.is_empty() {
            return Err(AppError::Validation("Photo file is required".to_string()));
        }
        if input.data.len() > MAX_UPLOAD_BYTES {
            return Err(AppError::Validation(format!(
                "Photo exceeds the maximum size of {MAX_UPLOAD_BYTES} bytes"
            )));
        }
        if !input.content_type.starts_with("image/") {
            return Err(AppError::Validation(
                "Only image uploads are accepted".to_string(),
            ));
        }

        let mut tags = normalize_tags(input.tags);
        validate_tags(&tags)?;
        if input.people.len() > MAX_PEOPLE_PER_PHOTO {
            return Err(AppError::Validation(format!(
                "Maximum of {MAX_PEOPLE_PER_PHOTO} tagged people allowed"
            )));
        }

        let photo_id = self.id_gen.generate();
        let blob_name = format!("{photo_id}.{}", blob_extension(&input.file_name));

        self.storage.save(&blob_name, &input.data).await?;
        let image_url = self.storage.url(&blob_name);

        // Optional AI analysis. Analysis failure is non-fatal; a moderation
        // verdict against the image is.
        let mut status = ModerationStatus::Approved;
        let mut ai_description = None;

        if (input.auto_tags || input.content_moderation)
            && let Some(ref vision) = self.vision
        {
            match vision.analyze(&image_url).await {
                Ok(analysis) => {
                    if input.content_moderation
                        && let Some(adult) = analysis.adult
                    {
                        if adult.is_blocked() {
                            if let Err(e) = self.storage.delete(&blob_name).await {
                                tracing::warn!(
                                    blob = %blob_name,
                                    error = %e,
                                    "Failed to delete rejected blob"
                                );
                            }
                            return Err(AppError::Validation(
                                "Image rejected due to inappropriate content".to_string(),
                            ));
                        }
                        if adult.is_racy_content {
                            status = ModerationStatus::PendingReview;
                        }
                    }

                    if input.auto_tags {
                        ai_description = analysis.description;
                        for tag in analysis.tags {
                            if !tags.contains(&tag) && tags.len() < MAX_TAGS_PER_PHOTO {
                                tags.push(tag);
                            }
                        }
                    }
                }
                Err(e) => {
                    tracing::warn!(error = %e, "Image analysis failed, continuing without it");
                }
            }
        }

        let category = tags
            .first()
            .cloned()
            .unwrap_or_else(|| "general".to_string());
        let avatar = creator
            .avatar
            .clone()
            .unwrap_or_else(|| generated_avatar(&creator.name));
        let now = chrono::Utc::now();

        let model = photo::ActiveModel {
            id: Set(photo_id),
            creator_id: Set(creator.id.clone()),
            creator_name: Set(creator.name.clone()),
            creator_avatar: Set(avatar),
            title: Set(title),
            caption: Set(input.caption),
            location: Set(input.location),
            people: Set(json!(input.people)),
            tags: Set(json!(tags)),
            category: Set(category),
            blob_name: Set(blob_name),
            image_url: Set(image_url),
            ai_description: Set(ai_description),
            status: Set(status),
            likes: Set(0),
            rating_sum: Set(0),
            rating_count: Set(0),
            rating: Set(0.0),
            comments: Set(0),
            views: Set(0),
            created_at: Set(now.into()),
            updated_at: Set(now.into()),
        };

        let created = self.photo_repo.create(model).await?;
        self.user_repo.increment_photos_count(&creator.id).await?;

        Ok(self.present(created))
    }

    /// List photos: filter, search, sort, paginate, enrich.
    ///
    /// A failed count fails the whole operation, since pagination metadata
    /// is required; per-item enrichment failures degrade instead.
    pub async fn list(
        &self,
        input: &ListPhotosInput,
        viewer: Option<&AuthenticatedUser>,
    ) -> AppResult<PhotoPage> {
        let query = PhotoQuery {
            category: (input.filter != "all" && !input.filter.is_empty())
                .then(|| input.filter.clone()),
            creator_id: input.creator_id.clone(),
            search: {
                let term = input.search.trim();
                (!term.is_empty()).then(|| term.to_string())
            },
            sort: PhotoSort::parse(&input.sort),
            page: PageRequest::new(input.page, input.limit),
        };

        let models = self.photo_repo.list(&query).await?;
        let total = self.photo_repo.count(&query).await?;

        let mut items: Vec<PhotoResponse> = models.into_iter().map(|m| self.present(m)).collect();
        if let Some(viewer) = viewer {
            self.enrich_for_viewer(&mut items, &viewer.id).await;
        }

        Ok(PhotoPage {
            items,
            pagination: PageInfo {
                page: query.page.page,
                limit: query.page.limit,
                total,
                total_pages: query.page.total_pages(total),
                has_more: query.page.has_more(total),
            },
        })
    }

    /// Get one photo by ID.
    ///
    /// Increments the view count best-effort; a failed persist logs a
    /// warning and never fails the read.
    pub async fn get(
        &self,
        photo_id: &str,
        viewer: Option<&AuthenticatedUser>,
    ) -> AppResult<PhotoResponse> {
        let model = self.photo_repo.get_by_id(photo_id).await?;

        let viewed = match self.photo_repo.increment_views(photo_id).await {
            Ok(()) => true,
            Err(e) => {
                tracing::warn!(photo_id = %photo_id, error = %e, "Failed to persist view count");
                false
            }
        };

        let mut response = self.present(model);
        if viewed {
            response.views += 1;
        }

        if let Some(viewer) = viewer {
            self.enrich_for_viewer(std::slice::from_mut(&mut response), &viewer.id)
                .await;
        }

        Ok(response)
    }

    /// Edit a photo. Owner only.
    pub async fn update(
        &self,
        user_id: &str,
        photo_id: &str,
        input: UpdatePhotoInput,
    ) -> AppResult<PhotoResponse> {
        let model = self.photo_repo.get_by_id(photo_id).await?;

        if model.creator_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to edit this photo".to_string(),
            ));
        }

        let mut active: photo::ActiveModel = model.into();

        if let Some(title) = input.title {
            let title = title.trim().to_string();
            if title.is_empty() || title.len() > 256 {
                return Err(AppError::Validation(
                    "Title must be between 1 and 256 characters".to_string(),
                ));
            }
            active.title = Set(title);
        }
        if let Some(caption) = input.caption {
            active.caption = Set(caption);
        }
        if let Some(location) = input.location {
            active.location = Set(location);
        }
        if let Some(people) = input.people {
            if people.len() > MAX_PEOPLE_PER_PHOTO {
                return Err(AppError::Validation(format!(
                    "Maximum of {MAX_PEOPLE_PER_PHOTO} tagged people allowed"
                )));
            }
            active.people = Set(json!(people));
        }
        if let Some(tags) = input.tags {
            let tags = normalize_tags(tags);
            validate_tags(&tags)?;
            // Category follows the first tag
            if let Some(first) = tags.first() {
                active.category = Set(first.clone());
            }
            active.tags = Set(json!(tags));
        }

        active.updated_at = Set(chrono::Utc::now().into());

        let updated = self.photo_repo.update(active).await?;
        Ok(self.present(updated))
    }

    /// Delete a photo and its blob. Owner only; comments, likes and ratings
    /// cascade at the schema level.
    pub async fn delete(&self, user_id: &str, photo_id: &str) -> AppResult<()> {
        let model = self.photo_repo.get_by_id(photo_id).await?;

        if model.creator_id != user_id {
            return Err(AppError::Forbidden(
                "Not authorized to delete this photo".to_string(),
            ));
        }

        if let Err(e) = self.storage.delete(&model.blob_name).await {
            tracing::warn!(
                photo_id = %photo_id,
                blob = %model.blob_name,
                error = %e,
                "Failed to delete blob, proceeding with record deletion"
            );
        }

        self.photo_repo.delete(photo_id).await?;
        self.user_repo
            .decrement_photos_count(&model.creator_id)
            .await?;
        Ok(())
    }

    /// Discovery search over approved photos, newest first.
    pub async fn search(
        &self,
        term: &str,
        viewer: Option<&AuthenticatedUser>,
    ) -> AppResult<Vec<PhotoResponse>> {
        let term = term.trim();
        if term.is_empty() {
            return Err(AppError::BadRequest(
                "Search query is required".to_string(),
            ));
        }

        let models = self.photo_repo.search(term, SEARCH_RESULT_LIMIT).await?;
        let mut items: Vec<PhotoResponse> = models.into_iter().map(|m| self.present(m)).collect();
        if let Some(viewer) = viewer {
            self.enrich_for_viewer(&mut items, &viewer.id).await;
        }
        Ok(items)
    }

    /// Platform statistics.
    pub async fn stats(&self) -> AppResult<PlatformStats> {
        let photos = self.photo_repo.count_approved().await?;
        let creators = self.user_repo.count_creators().await?;
        let views = self.photo_repo.total_views().await?;

        Ok(PlatformStats {
            photos,
            creators,
            views,
        })
    }

    /// Convert a stored photo into its caller-facing shape, substituting a
    /// freshly signed asset URL when the stored one carries no token.
    /// Minting failure degrades to the stored URL.
    fn present(&self, p: photo::Model) -> PhotoResponse {
        let image_url = if SignedUrlIssuer::is_signed(&p.image_url) {
            p.image_url
        } else {
            match self.urls.mint(&p.image_url, &p.blob_name) {
                Ok(signed) => signed,
                Err(e) => {
                    tracing::warn!(photo_id = %p.id, error = %e, "Failed to sign asset URL");
                    p.image_url
                }
            }
        };

        PhotoResponse {
            id: p.id,
            title: p.title,
            caption: p.caption,
            image_url,
            location: p.location,
            people: serde_json::from_value(p.people).unwrap_or_default(),
            tags: serde_json::from_value(p.tags).unwrap_or_default(),
            category: p.category,
            ai_description: p.ai_description,
            status: p.status,
            creator_id: p.creator_id.clone(),
            creator: CreatorInfo {
                id: p.creator_id,
                name: p.creator_name,
                avatar: p.creator_avatar,
            },
            likes: p.likes,
            rating: p.rating,
            rating_count: p.rating_count,
            comments: p.comments,
            views: p.views,
            created_at: p.created_at.to_rfc3339(),
            updated_at: p.updated_at.to_rfc3339(),
            user_liked: false,
            user_rating: 0,
        }
    }

    /// Attach the caller's like/rating flags, one batched query per
    /// relation. Lookup failures degrade to the defaults with a warning.
    async fn enrich_for_viewer(&self, items: &mut [PhotoResponse], viewer_id: &str) {
        let ids: Vec<String> = items.iter().map(|p| p.id.clone()).collect();

        match self.like_repo.find_liked_among(viewer_id, &ids).await {
            Ok(likes) => {
                let liked: HashSet<String> = likes.into_iter().map(|l| l.photo_id).collect();
                for item in items.iter_mut() {
                    item.user_liked = liked.contains(&item.id);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load caller likes, defaulting to false");
            }
        }

        match self.rating_repo.find_among(viewer_id, &ids).await {
            Ok(ratings) => {
                let scores: HashMap<String, i32> = ratings
                    .into_iter()
                    .map(|r| (r.photo_id, r.score))
                    .collect();
                for item in items.iter_mut() {
                    item.user_rating = scores.get(&item.id).copied().unwrap_or(0);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load caller ratings, defaulting to 0");
            }
        }
    }
}

/// Trim, lowercase and deduplicate tags, preserving order.
fn normalize_tags(tags: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    tags.into_iter()
        .map(|t| t.trim().to_lowercase())
        .filter(|t| !t.is_empty())
        .filter(|t| seen.insert(t.clone()))
        .collect()
}

fn validate_tags(tags: &[String]) -> AppResult<()> {
    if tags.len() > MAX_TAGS_PER_PHOTO {
        return Err(AppError::Validation(format!(
            "Maximum of {MAX_TAGS_PER_PHOTO} tags allowed per photo"
        )));
    }
    for tag in tags {
        if tag.len() > 128 {
            return Err(AppError::Validation(
                "Tag must be at most 128 characters".to_string(),
            ));
        }
    }
    Ok(())
}

/// File extension for a blob name, falling back to "bin".
fn blob_extension(original_name: &str) -> String {
    original_name
        .rsplit('.')
        .next()
        .filter(|ext| !ext.is_empty() && ext.len() <= 10 && ext.chars().all(char::is_alphanumeric))
        .map_or_else(|| "bin".to_string(), str::to_lowercase)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::Utc;
    use photoshare_common::{NoOpStorage, Role};
    use sea_orm::{DatabaseBackend, MockDatabase, MockExecResult};
    use std::sync::Arc;

    fn viewer(id: &str, role: Role) -> AuthenticatedUser {
        AuthenticatedUser {
            id: id.to_string(),
            name: "Test User".to_string(),
            email: format!("{id}@example.com"),
            role,
            avatar: None,
        }
    }

    fn test_photo(id: &str, views: i32) -> photo::Model {
        photo::Model {
            id: id.to_string(),
            creator_id: "creator1".to_string(),
            creator_name: "Creator".to_string(),
            creator_avatar: "https://example.com/a.png".to_string(),
            title: "Sunset Glow".to_string(),
            caption: "Evening light".to_string(),
            location: String::new(),
            people: json!([]),
            tags: json!(["sky", "sunset"]),
            category: "sky".to_string(),
            blob_name: format!("{id}.jpg"),
            image_url: format!("https://cdn.example.com/blobs/{id}.jpg"),
            ai_description: None,
            status: ModerationStatus::Approved,
            likes: 3,
            rating_sum: 8,
            rating_count: 2,
            rating: 4.0,
            comments: 1,
            views,
            created_at: Utc::now().into(),
            updated_at: Utc::now().into(),
        }
    }

    fn service_with(
        photo_db: Arc<sea_orm::DatabaseConnection>,
        like_db: Arc<sea_orm::DatabaseConnection>,
        rating_db: Arc<sea_orm::DatabaseConnection>,
        user_db: Arc<sea_orm::DatabaseConnection>,
    ) -> PhotoService {
        PhotoService::new(
            PhotoRepository::new(photo_db),
            LikeRepository::new(like_db),
            RatingRepository::new(rating_db),
            UserRepository::new(user_db),
            Arc::new(NoOpStorage::new("https://cdn.example.com".to_string())),
            SignedUrlIssuer::new("account-key", 3600),
            None,
        )
    }

    fn empty_mock() -> Arc<sea_orm::DatabaseConnection> {
        Arc::new(MockDatabase::new(DatabaseBackend::Postgres).into_connection())
    }

    #[test]
    fn test_normalize_tags() {
        let tags = normalize_tags(vec![
            " Nature ".to_string(),
            "NATURE".to_string(),
            "sky".to_string(),
            String::new(),
        ]);
        assert_eq!(tags, vec!["nature", "sky"]);
    }

    #[test]
    fn test_blob_extension() {
        assert_eq!(blob_extension("photo.JPG"), "jpg");
        assert_eq!(blob_extension("archive.tar.gz"), "gz");
        assert_eq!(blob_extension("noextension"), "bin");
        assert_eq!(blob_extension("weird.!!!"), "bin");
    }

    #[tokio::test]
    async fn test_upload_requires_creator_role() {
        let service = service_with(empty_mock(), empty_mock(), empty_mock(), empty_mock());

        let result = service
            .upload(
                &viewer("user1", Role::Consumer),
                UploadPhotoInput {
                    title: "A Photo".to_string(),
                    caption: String::new(),
                    location: String::new(),
                    people: vec![],
                    tags: vec![],
                    auto_tags: false,
                    content_moderation: false,
                    file_name: "photo.jpg".to_string(),
                    content_type: "image/jpeg".to_string(),
                    data: vec![1, 2, 3],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_upload_requires_title() {
        let service = service_with(empty_mock(), empty_mock(), empty_mock(), empty_mock());

        let result = service
            .upload(
                &viewer("creator1", Role::Creator),
                UploadPhotoInput {
                    title: "   ".to_string(),
                    caption: String::new(),
                    location: String::new(),
                    people: vec![],
                    tags: vec![],
                    auto_tags: false,
                    content_moderation: false,
                    file_name: "photo.jpg".to_string(),
                    content_type: "image/jpeg".to_string(),
                    data: vec![1, 2, 3],
                },
            )
            .await;

        assert!(matches!(result, Err(AppError::Validation(_))));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([Vec::<photo::Model>::new()])
                .into_connection(),
        );
        let service = service_with(photo_db, empty_mock(), empty_mock(), empty_mock());

        let result = service.get("missing", None).await;
        match result {
            Err(AppError::PhotoNotFound(id)) => assert_eq!(id, "missing"),
            other => panic!("Expected PhotoNotFound, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_get_anonymous_defaults_and_view_increment() {
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_photo("p1", 7)]])
                .append_exec_results([MockExecResult {
                    last_insert_id: 0,
                    rows_affected: 1,
                }])
                .into_connection(),
        );
        let service = service_with(photo_db, empty_mock(), empty_mock(), empty_mock());

        let response = service.get("p1", None).await.unwrap();
        assert_eq!(response.views, 8);
        assert!(!response.user_liked);
        assert_eq!(response.user_rating, 0);
        // Stored URL had no token, so the response must carry one
        assert!(response.image_url.contains("sig="));
        assert!(SignedUrlIssuer::is_signed(&response.image_url));
    }

    #[tokio::test]
    async fn test_get_survives_failed_view_increment() {
        // Second statement (the view-count update) errors; the read still
        // succeeds and the stored count is returned unchanged.
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_photo("p1", 7)]])
                .append_exec_errors([sea_orm::DbErr::Custom("write failed".to_string())])
                .into_connection(),
        );
        let service = service_with(photo_db, empty_mock(), empty_mock(), empty_mock());

        let response = service.get("p1", None).await.unwrap();
        assert_eq!(response.views, 7);
    }

    #[tokio::test]
    async fn test_list_pagination_metadata() {
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_photo("p1", 0), test_photo("p2", 0)]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(5))
                }]])
                .into_connection(),
        );
        let service = service_with(photo_db, empty_mock(), empty_mock(), empty_mock());

        let page = service
            .list(
                &ListPhotosInput {
                    page: 1,
                    limit: 2,
                    ..ListPhotosInput::default()
                },
                None,
            )
            .await
            .unwrap();

        assert_eq!(page.items.len(), 2);
        assert_eq!(page.pagination.total, 5);
        assert_eq!(page.pagination.total_pages, 3);
        assert!(page.pagination.has_more);
    }

    #[tokio::test]
    async fn test_list_count_failure_fails_operation() {
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_photo("p1", 0)]])
                .append_query_errors([sea_orm::DbErr::Custom("count failed".to_string())])
                .into_connection(),
        );
        let service = service_with(photo_db, empty_mock(), empty_mock(), empty_mock());

        let result = service.list(&ListPhotosInput::default(), None).await;
        assert!(matches!(result, Err(AppError::Database(_))));
    }

    #[tokio::test]
    async fn test_list_enriches_for_viewer() {
        use photoshare_db::entities::{photo_like, rating};

        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_photo("p1", 0), test_photo("p2", 0)]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(2))
                }]])
                .into_connection(),
        );
        let like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[photo_like::Model {
                    id: "l1".to_string(),
                    photo_id: "p2".to_string(),
                    user_id: "user1".to_string(),
                    created_at: Utc::now().into(),
                }]])
                .into_connection(),
        );
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[rating::Model {
                    id: "r1".to_string(),
                    photo_id: "p1".to_string(),
                    user_id: "user1".to_string(),
                    score: 4,
                    created_at: Utc::now().into(),
                    updated_at: None,
                }]])
                .into_connection(),
        );
        let service = service_with(photo_db, like_db, rating_db, empty_mock());

        let page = service
            .list(
                &ListPhotosInput::default(),
                Some(&viewer("user1", Role::Consumer)),
            )
            .await
            .unwrap();

        let p1 = page.items.iter().find(|p| p.id == "p1").unwrap();
        let p2 = page.items.iter().find(|p| p.id == "p2").unwrap();
        assert!(!p1.user_liked);
        assert_eq!(p1.user_rating, 4);
        assert!(p2.user_liked);
        assert_eq!(p2.user_rating, 0);
    }

    #[tokio::test]
    async fn test_list_enrichment_failure_degrades() {
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([vec![test_photo("p1", 0)]])
                .append_query_results([[maplit::btreemap! {
                    "num_items" => sea_orm::Value::BigInt(Some(1))
                }]])
                .into_connection(),
        );
        let like_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([sea_orm::DbErr::Custom("likes down".to_string())])
                .into_connection(),
        );
        let rating_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_errors([sea_orm::DbErr::Custom("ratings down".to_string())])
                .into_connection(),
        );
        let service = service_with(photo_db, like_db, rating_db, empty_mock());

        // Enrichment lookups fail, the listing still succeeds with defaults
        let page = service
            .list(
                &ListPhotosInput::default(),
                Some(&viewer("user1", Role::Consumer)),
            )
            .await
            .unwrap();

        assert!(!page.items[0].user_liked);
        assert_eq!(page.items[0].user_rating, 0);
    }

    #[tokio::test]
    async fn test_update_by_non_owner_is_forbidden() {
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_photo("p1", 0)]])
                .into_connection(),
        );
        let service = service_with(photo_db, empty_mock(), empty_mock(), empty_mock());

        let result = service
            .update("intruder", "p1", UpdatePhotoInput::default())
            .await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_delete_by_non_owner_is_forbidden() {
        let photo_db = Arc::new(
            MockDatabase::new(DatabaseBackend::Postgres)
                .append_query_results([[test_photo("p1", 0)]])
                .into_connection(),
        );
        let service = service_with(photo_db, empty_mock(), empty_mock(), empty_mock());

        let result = service.delete("intruder", "p1").await;
        assert!(matches!(result, Err(AppError::Forbidden(_))));
    }

    #[tokio::test]
    async fn test_search_requires_query() {
        let service = service_with(empty_mock(), empty_mock(), empty_mock(), empty_mock());
        let result = service.search("   ", None).await;
        assert!(matches!(result, Err(AppError::BadRequest(_))));
    }

    #[test]
    fn test_present_preserves_existing_token() {
        let service = service_with(empty_mock(), empty_mock(), empty_mock(), empty_mock());
        let mut photo = test_photo("p1", 0);
        photo.image_url = "https://cdn.example.com/blobs/p1.jpg?se=9999999999&sp=r&sig=abc".to_string();

        let response = service.present(photo);
        // Already-tokenized URLs are passed through, not double-signed
        assert_eq!(
            response.image_url,
            "https://cdn.example.com/blobs/p1.jpg?se=9999999999&sp=r&sig=abc"
        );
    }
}
