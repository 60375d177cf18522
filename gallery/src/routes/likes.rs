use std::sync::{Arc, LazyLock};

use axum::{Extension, Json};
use like_storage::ImageLikeService;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use validator::Validate;

use crate::types::{AppError, ValidatedForm};

/// A decoded path segment: no `/` and no control characters
static IMAGE_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^/\p{Cc}]+$").expect("image id pattern is valid"));

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct LikeRequest {
    /// Image id, the decoded last path segment of the image URI
    #[validate(
        length(min = 1, max = 1024, message = "Invalid image id"),
        regex(path = *IMAGE_ID, message = "Invalid image id")
    )]
    pub image_id: String,
}

/// Outcome of a like, read by the gallery page script
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LikeResponse {
    /// Whether the like was recorded
    pub success: bool,
    /// Like count after the increment
    #[serde(skip_serializing_if = "Option::is_none")]
    pub likes: Option<u64>,
    /// Why the like was not recorded
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl LikeResponse {
    const fn liked(likes: u64) -> Self {
        Self {
            success: true,
            likes: Some(likes),
            message: None,
        }
    }

    fn failed(message: impl Into<String>) -> Self {
        Self {
            success: false,
            likes: None,
            message: Some(message.into()),
        }
    }
}

/// Adds one like to an image
///
/// Always answers with a 200; failures are reported in the body.
#[instrument(skip(like_service, payload))]
pub async fn like_image(
    Extension(like_service): Extension<Arc<ImageLikeService>>,
    payload: Result<ValidatedForm<LikeRequest>, AppError>,
) -> Json<LikeResponse> {
    let ValidatedForm(request) = match payload {
        Ok(payload) => payload,
        Err(err) => {
            tracing::warn!("Rejected like: {}", err.message());
            return Json(LikeResponse::failed(err.message()));
        }
    };

    match like_service.add_like(&request.image_id).await {
        Ok(likes) => Json(LikeResponse::liked(likes)),
        Err(e) => {
            tracing::error!("Failed to like image {}: {e}", request.image_id);
            Json(LikeResponse::failed(e.to_string()))
        }
    }
}
