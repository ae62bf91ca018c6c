//! API response envelope.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use photoshare_core::{PageInfo, PhotoPage, PhotoResponse};
use serde::Serialize;

/// Standard API response wrapper: `{success, message?, data?, pagination?}`.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pagination: Option<PageInfo>,
    #[serde(skip)]
    status: StatusCode,
}

impl<T: Serialize> ApiResponse<T> {
    /// Create a success response.
    pub const fn ok(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
            status: StatusCode::OK,
        }
    }

    /// Create a 201 response for newly created resources.
    pub const fn created(data: T) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(data),
            pagination: None,
            status: StatusCode::CREATED,
        }
    }

    /// Attach a human-readable message.
    #[must_use]
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl ApiResponse<Vec<PhotoResponse>> {
    /// Create a paginated listing response.
    #[must_use]
    pub fn page(page: PhotoPage) -> Self {
        Self {
            success: true,
            message: None,
            data: Some(page.items),
            pagination: Some(page.pagination),
            status: StatusCode::OK,
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let resp = ApiResponse::ok(serde_json::json!({"id": "x"}));
        let value = serde_json::to_value(&resp).unwrap();

        assert_eq!(value["success"], true);
        assert_eq!(value["data"]["id"], "x");
        assert!(value.get("message").is_none());
        assert!(value.get("pagination").is_none());
    }

    #[test]
    fn test_message_is_serialized() {
        let resp = ApiResponse::ok(()).with_message("done");
        let value = serde_json::to_value(&resp).unwrap();
        assert_eq!(value["message"], "done");
    }
}
