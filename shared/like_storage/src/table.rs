//! Table store abstraction for like records

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use strum::Display;

use crate::LikeStorageResult;

/// Attribute names for the likes table
#[derive(Debug, Clone, Display)]
#[strum(serialize_all = "snake_case")]
pub enum ImageLikeAttribute {
    /// Logical grouping key (Partition Key)
    PartitionKey,
    /// Image identifier (Sort Key)
    RowKey,
    /// Number of likes
    LikeCount,
}

/// Like record data structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageLike {
    /// Logical grouping key, always `images` for gallery records
    pub partition_key: String,
    /// Image identifier
    pub row_key: String,
    /// Number of likes
    pub like_count: u64,
}

/// Operations the like service needs from a partitioned key-value table.
///
/// Absent records are reported as `Ok(None)` (or silently ignored for deletes),
/// never as errors.
#[async_trait]
pub trait LikeTable: Send + Sync {
    /// Creates the backing table when it does not exist yet.
    ///
    /// Returns [`LikeStorageError::TableBeingDeleted`](crate::LikeStorageError::TableBeingDeleted)
    /// while a previous incarnation of the table is still being removed.
    async fn ensure_table(&self) -> LikeStorageResult<()>;

    /// Gets a single record by key
    async fn get(&self, partition_key: &str, row_key: &str)
        -> LikeStorageResult<Option<ImageLike>>;

    /// Gets every record in a partition
    async fn query_partition(&self, partition_key: &str) -> LikeStorageResult<Vec<ImageLike>>;

    /// Atomically adds one to a record, creating it with a count of one when absent
    async fn increment(&self, partition_key: &str, row_key: &str) -> LikeStorageResult<ImageLike>;

    /// Deletes a single record
    async fn delete(&self, partition_key: &str, row_key: &str) -> LikeStorageResult<()>;

    /// Deletes every record in a partition, returning how many were removed
    async fn delete_partition(&self, partition_key: &str) -> LikeStorageResult<usize>;
}
