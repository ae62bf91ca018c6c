//! Photo endpoints: listing, retrieval, upload, edit, delete.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, Multipart, Path, Query, State},
    routing::get,
};
use photoshare_common::{AppError, AppResult};
use photoshare_core::photo::MAX_UPLOAD_BYTES;
use photoshare_core::{ListPhotosInput, PhotoResponse, UpdatePhotoInput, UploadPhotoInput};
use photoshare_db::query::DEFAULT_PAGE_SIZE;
use serde::Deserialize;

use crate::{
    extractors::{AuthUser, MaybeAuthUser},
    middleware::AppState,
    response::ApiResponse,
};

/// Raw listing parameters.
///
/// Everything is accepted as an optional string and parsed leniently:
/// malformed values fall back to their defaults, they never reject the
/// request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPhotosParams {
    #[serde(default)]
    pub page: Option<String>,
    #[serde(default)]
    pub limit: Option<String>,
    #[serde(default)]
    pub filter: Option<String>,
    #[serde(default)]
    pub sort: Option<String>,
    #[serde(default)]
    pub search: Option<String>,
    #[serde(default)]
    pub creator_id: Option<String>,
}

impl ListPhotosParams {
    fn into_input(self) -> ListPhotosInput {
        ListPhotosInput {
            page: parse_positive(self.page, 1),
            limit: parse_positive(self.limit, DEFAULT_PAGE_SIZE),
            filter: self.filter.unwrap_or_else(|| "all".to_string()),
            sort: self.sort.unwrap_or_else(|| "newest".to_string()),
            search: self.search.unwrap_or_default(),
            creator_id: self.creator_id.filter(|s| !s.is_empty()),
        }
    }
}

/// Parse a positive integer parameter, defaulting anything else.
fn parse_positive(value: Option<String>, default: u64) -> u64 {
    value
        .and_then(|s| s.parse::<u64>().ok())
        .filter(|&n| n > 0)
        .unwrap_or(default)
}

/// List photos with filtering, search, sorting and pagination.
async fn list_photos(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Query(params): Query<ListPhotosParams>,
) -> AppResult<ApiResponse<Vec<PhotoResponse>>> {
    let input = params.into_input();
    let page = state.photo_service.list(&input, user.as_ref()).await?;
    Ok(ApiResponse::page(page))
}

/// Get a single photo by ID.
async fn get_photo(
    MaybeAuthUser(user): MaybeAuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<PhotoResponse>> {
    let photo = state.photo_service.get(&photo_id, user.as_ref()).await?;
    Ok(ApiResponse::ok(photo))
}

/// Upload a photo (creator only, multipart form).
async fn upload_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> AppResult<ApiResponse<PhotoResponse>> {
    let mut title = String::new();
    let mut caption = String::new();
    let mut location = String::new();
    let mut people = Vec::new();
    let mut tags = Vec::new();
    let mut auto_tags = false;
    let mut content_moderation = false;
    let mut file: Option<(String, String, Vec<u8>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart payload: {e}")))?
    {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "photo" => {
                let file_name = field.file_name().unwrap_or("upload.bin").to_string();
                let content_type = field
                    .content_type()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                let data = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read photo: {e}")))?
                    .to_vec();
                file = Some((file_name, content_type, data));
            }
            "title" => title = read_text(field).await?,
            "caption" => caption = read_text(field).await?,
            "location" => location = read_text(field).await?,
            "people" => people = split_csv(&read_text(field).await?),
            "tags" => tags = split_csv(&read_text(field).await?),
            "autoTags" => auto_tags = read_text(field).await? == "true",
            "contentModeration" => content_moderation = read_text(field).await? == "true",
            _ => {}
        }
    }

    let Some((file_name, content_type, data)) = file else {
        return Err(AppError::Validation(
            "Photo and title are required".to_string(),
        ));
    };

    let photo = state
        .photo_service
        .upload(
            &user,
            UploadPhotoInput {
                title,
                caption,
                location,
                people,
                tags,
                auto_tags,
                content_moderation,
                file_name,
                content_type,
                data,
            },
        )
        .await?;

    let message = match photo.status {
        photoshare_db::entities::photo::ModerationStatus::Approved => {
            "Photo uploaded successfully"
        }
        _ => "Photo uploaded and pending review",
    };
    Ok(ApiResponse::created(photo).with_message(message))
}

/// Edit a photo (owner only).
async fn update_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
    Json(input): Json<UpdatePhotoInput>,
) -> AppResult<ApiResponse<PhotoResponse>> {
    let photo = state
        .photo_service
        .update(&user.id, &photo_id, input)
        .await?;
    Ok(ApiResponse::ok(photo).with_message("Photo updated successfully"))
}

/// Delete a photo (owner only).
async fn delete_photo(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(photo_id): Path<String>,
) -> AppResult<ApiResponse<()>> {
    state.photo_service.delete(&user.id, &photo_id).await?;
    Ok(ApiResponse::ok(()).with_message("Photo deleted successfully"))
}

async fn read_text(field: axum::extract::multipart::Field<'_>) -> AppResult<String> {
    field
        .text()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid form field: {e}")))
}

fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(ToString::to_string)
        .collect()
}

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list_photos).post(upload_photo))
        .route(
            "/{photo_id}",
            get(get_photo).put(update_photo).delete(delete_photo),
        )
        .layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES + 1024 * 1024))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_positive() {
        assert_eq!(parse_positive(Some("3".to_string()), 1), 3);
        assert_eq!(parse_positive(Some("0".to_string()), 12), 12);
        assert_eq!(parse_positive(Some("-2".to_string()), 12), 12);
        assert_eq!(parse_positive(Some("abc".to_string()), 12), 12);
        assert_eq!(parse_positive(None, 12), 12);
    }

    #[test]
    fn test_params_defaulting() {
        let input = ListPhotosParams::default().into_input();
        assert_eq!(input.page, 1);
        assert_eq!(input.limit, DEFAULT_PAGE_SIZE);
        assert_eq!(input.filter, "all");
        assert_eq!(input.sort, "newest");
        assert!(input.search.is_empty());
        assert!(input.creator_id.is_none());
    }

    #[test]
    fn test_split_csv() {
        assert_eq!(split_csv("a, b ,,c"), vec!["a", "b", "c"]);
        assert!(split_csv("").is_empty());
    }
}
