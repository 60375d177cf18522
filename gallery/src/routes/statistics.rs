use std::sync::Arc;

use axum::{response::Html, Extension};
use chrono::Utc;
use like_storage::ImageLikeService;
use tracing::instrument;

use crate::{
    media_storage::ImageStore,
    statistics::StatisticsSnapshot,
    types::AppError,
    views::{render, StatisticsPage},
};

/// Renders usage statistics of the gallery
///
/// # Errors
///
/// Returns a 500 if the image metadata cannot be listed
#[instrument(skip(image_store, like_service))]
pub async fn handler(
    Extension(image_store): Extension<Arc<dyn ImageStore>>,
    Extension(like_service): Extension<Arc<ImageLikeService>>,
) -> Result<Html<String>, AppError> {
    let (blobs, likes) = tokio::join!(image_store.list_info(), like_service.get_all_likes());
    let blobs = blobs?;

    let snapshot = StatisticsSnapshot::compute(&blobs, &likes, Utc::now().date_naive());
    tracing::debug!(
        "Statistics: {} images, {} bytes, {} likes",
        snapshot.total_images,
        snapshot.total_disk_space,
        snapshot.total_likes
    );

    let html = render(&StatisticsPage::from(&snapshot)).map_err(|e| AppError::internal(&e))?;
    Ok(Html(html))
}
