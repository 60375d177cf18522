//! Like counts per image
//!
//! Read paths never surface backend failures: a missing record and an unreachable
//! table both read as "no likes" so the gallery stays available.

use std::collections::HashMap;
use std::sync::Arc;

use tracing::{error, info, instrument, warn};

use crate::{LikeStorageResult, LikeTable, RetryPolicy};

/// Partition holding every image like record
pub const IMAGES_PARTITION: &str = "images";

/// Like count service backed by a [`LikeTable`]
pub struct ImageLikeService {
    table: Arc<dyn LikeTable>,
}

impl ImageLikeService {
    /// Creates the service after making sure the backing table exists
    ///
    /// Table creation is retried according to `retry_policy` while a previous
    /// table with the same name is still being deleted.
    ///
    /// # Errors
    ///
    /// Returns `LikeStorageError::RetriesExhausted` if the table stays in the
    /// deleting state, or the underlying error if creation fails otherwise
    pub async fn initialize(
        table: Arc<dyn LikeTable>,
        retry_policy: &RetryPolicy,
    ) -> LikeStorageResult<Self> {
        retry_policy
            .run(|| table.ensure_table())
            .await
            .inspect_err(|err| error!("Failed to initialize likes table: {err}"))?;

        info!("Likes table ready");
        Ok(Self { table })
    }

    /// Wraps a table that is already known to exist
    #[must_use]
    pub fn new(table: Arc<dyn LikeTable>) -> Self {
        Self { table }
    }

    /// Gets the like count for an image, `0` when it was never liked or the lookup failed
    #[instrument(skip(self))]
    pub async fn get_likes(&self, image_id: &str) -> u64 {
        match self.table.get(IMAGES_PARTITION, image_id).await {
            Ok(Some(like)) => like.like_count,
            Ok(None) => 0,
            Err(err) => {
                error!("Failed to get likes for image {image_id}: {err}");
                0
            }
        }
    }

    /// Gets the like count of every liked image, empty when the lookup failed
    #[instrument(skip(self))]
    pub async fn get_all_likes(&self) -> HashMap<String, u64> {
        match self.table.query_partition(IMAGES_PARTITION).await {
            Ok(likes) => likes
                .into_iter()
                .map(|like| (like.row_key, like.like_count))
                .collect(),
            Err(err) if err.is_transient() => {
                warn!("{err}. Returning empty results.");
                HashMap::new()
            }
            Err(err) => {
                error!("Error retrieving likes: {err}");
                HashMap::new()
            }
        }
    }

    /// Adds one like to an image and returns its new count
    ///
    /// # Errors
    ///
    /// Returns `LikeStorageError` if the table store rejects the update
    #[instrument(skip(self))]
    pub async fn add_like(&self, image_id: &str) -> LikeStorageResult<u64> {
        let like = self.table.increment(IMAGES_PARTITION, image_id).await?;
        Ok(like.like_count)
    }

    /// Forgets the likes of a deleted image
    ///
    /// # Errors
    ///
    /// Returns `LikeStorageError` if the table store rejects the delete
    #[instrument(skip(self))]
    pub async fn remove_likes(&self, image_id: &str) -> LikeStorageResult<()> {
        self.table.delete(IMAGES_PARTITION, image_id).await
    }

    /// Forgets the likes of every image
    ///
    /// # Errors
    ///
    /// Returns `LikeStorageError` if the table store rejects a delete
    #[instrument(skip(self))]
    pub async fn remove_all_likes(&self) -> LikeStorageResult<usize> {
        self.table.delete_partition(IMAGES_PARTITION).await
    }
}
