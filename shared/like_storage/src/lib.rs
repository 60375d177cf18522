//! Like storage for the photo gallery
//!
//! This crate owns the like counts shown next to every image. Counts live in a
//! partitioned table store (`DynamoDB` in production) behind the [`LikeTable`]
//! trait, and [`ImageLikeService`] layers the gallery's read semantics on top:
//! missing records read as zero and read failures degrade to empty results.

mod error;

pub mod dynamodb;
pub mod image_like;
pub mod retry;
pub mod table;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

pub use error::{LikeStorageError, LikeStorageResult};
pub use image_like::{ImageLikeService, IMAGES_PARTITION};
pub use retry::RetryPolicy;
pub use table::{ImageLike, ImageLikeAttribute, LikeTable};
