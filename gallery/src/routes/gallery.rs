use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, Multipart},
    response::{Html, Redirect},
    Extension,
};
use like_storage::ImageLikeService;
use serde::Deserialize;
use tracing::instrument;
use url::Url;
use validator::{Validate, ValidationError};

use crate::{
    media_storage::{image_id_from_uri, ImageStore, UploadedFile},
    types::{AppError, ValidatedForm},
    views::{render, ImageView, IndexPage},
};

#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct DeleteImageRequest {
    /// Public URI of the image, as listed on the gallery page
    #[validate(custom(function = "validate_file_uri"))]
    pub file_uri: String,
}

fn validate_file_uri(file_uri: &str) -> Result<(), ValidationError> {
    parse_file_uri(file_uri)
        .map(|_| ())
        .ok_or_else(|| ValidationError::new("file_uri").with_message("Invalid file URI".into()))
}

/// Keeps the status of the multipart error, 413 for bodies over the upload limit
fn multipart_error(err: &MultipartError) -> AppError {
    AppError::new(err.status(), err.body_text())
}

fn parse_file_uri(file_uri: &str) -> Option<Url> {
    let uri = Url::parse(file_uri.trim()).ok()?;
    image_id_from_uri(&uri)?;
    Some(uri)
}

/// Renders the gallery page with every image and its like count
///
/// # Errors
///
/// Returns a 500 if either the image listing or the like lookup fails
#[instrument(skip(image_store, like_service))]
pub async fn index(
    Extension(image_store): Extension<Arc<dyn ImageStore>>,
    Extension(like_service): Extension<Arc<ImageLikeService>>,
) -> Result<Html<String>, AppError> {
    let (uris, likes) = tokio::join!(image_store.list(), like_service.get_all_likes());
    let uris = uris?;

    let images = uris
        .into_iter()
        .map(|uri| {
            let image_id = image_id_from_uri(&uri).unwrap_or_default();
            let likes = likes.get(&image_id).copied().unwrap_or(0);
            ImageView {
                uri: uri.to_string(),
                image_id,
                likes,
            }
        })
        .collect();

    let html = render(&IndexPage { images }).map_err(|e| AppError::internal(&e))?;
    Ok(Html(html))
}

/// Stores every file of a multipart upload form
///
/// # Errors
///
/// Returns a 400 when the form holds no file or only empty files, and a 500
/// when the image store rejects the upload
#[instrument(skip(image_store, multipart))]
pub async fn upload(
    Extension(image_store): Extension<Arc<dyn ImageStore>>,
    mut multipart: Multipart,
) -> Result<Redirect, AppError> {
    let mut file_parts = 0;
    let mut files = Vec::new();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(&e))?
    {
        let Some(file_name) = field.file_name().map(ToString::to_string) else {
            continue;
        };
        file_parts += 1;

        let content_type = field.content_type().map(ToString::to_string);
        let data = field
            .bytes()
            .await
            .map_err(|e| multipart_error(&e))?;

        if data.is_empty() {
            tracing::debug!("Skipping empty file {file_name}");
            continue;
        }

        files.push(UploadedFile {
            file_name,
            content_type,
            data,
        });
    }

    if file_parts == 0 {
        return Err(AppError::bad_request("Could not upload files"));
    }
    if files.is_empty() {
        return Err(AppError::bad_request("Could not upload empty files"));
    }

    image_store.upload(files).await?;

    Ok(Redirect::to("/"))
}

/// Deletes a single image and its like count
///
/// # Errors
///
/// Returns a 400 for a malformed `fileUri` or one outside the image base URL,
/// and a 500 if the image store fails
#[instrument(skip(image_store, like_service, payload))]
pub async fn delete_image(
    Extension(image_store): Extension<Arc<dyn ImageStore>>,
    Extension(like_service): Extension<Arc<ImageLikeService>>,
    ValidatedForm(payload): ValidatedForm<DeleteImageRequest>,
) -> Result<Redirect, AppError> {
    let uri = parse_file_uri(&payload.file_uri)
        .ok_or_else(|| AppError::bad_request("Invalid file URI"))?;

    image_store.delete(&uri).await?;

    if let Some(image_id) = image_id_from_uri(&uri) {
        if let Err(e) = like_service.remove_likes(&image_id).await {
            tracing::error!("Failed to remove likes of deleted image {image_id}: {e}");
        }
    }

    Ok(Redirect::to("/"))
}

/// Deletes every image and every like count
///
/// # Errors
///
/// Returns a 500 if the image store fails
#[instrument(skip(image_store, like_service))]
pub async fn delete_all(
    Extension(image_store): Extension<Arc<dyn ImageStore>>,
    Extension(like_service): Extension<Arc<ImageLikeService>>,
) -> Result<Redirect, AppError> {
    image_store.delete_all().await?;

    if let Err(e) = like_service.remove_all_likes().await {
        tracing::error!("Failed to remove likes after deleting all images: {e}");
    }

    Ok(Redirect::to("/"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_uri_requires_image_segment() {
        assert!(parse_file_uri("http://localhost:4566/bucket/cat.png").is_some());
        assert!(parse_file_uri(" http://localhost:4566/bucket/cat.png ").is_some());
        assert!(parse_file_uri("http://localhost:4566/bucket/").is_none());
        assert!(parse_file_uri("cat.png").is_none());
        assert!(parse_file_uri("").is_none());
    }

    #[test]
    fn test_delete_request_validation_message() {
        let request = DeleteImageRequest {
            file_uri: "not a uri".to_string(),
        };

        let errors = request.validate().unwrap_err();
        let field_errors = errors.field_errors();
        let message = field_errors["file_uri"][0].message.as_deref();
        assert_eq!(message, Some("Invalid file URI"));
    }
}
