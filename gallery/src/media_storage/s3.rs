//! S3-based image storage operations

use std::sync::Arc;

use async_trait::async_trait;
use aws_sdk_s3::{
    primitives::ByteStream,
    types::{Delete, Object, ObjectIdentifier},
    Client as S3Client,
};
use chrono::{DateTime, Utc};
use futures::future::try_join_all;
use tracing::{debug, info};
use url::Url;

use super::{
    image_uri, keyed_files, object_key_from_uri, BlobInfo, BucketError, BucketResult, ImageStore,
    UploadedFile,
};

/// `DeleteObjects` accepts at most this many keys per request
const MAX_KEYS_PER_DELETE: usize = 1000;

/// Image storage client for S3 operations
pub struct MediaStorage {
    s3_client: Arc<S3Client>,
    bucket_name: String,
    image_base_url: String,
}

impl MediaStorage {
    /// Creates a new media storage client
    ///
    /// # Arguments
    ///
    /// * `s3_client` - Pre-configured S3 client
    /// * `bucket_name` - S3 bucket name for image storage
    /// * `image_base_url` - Public base URL the object keys are appended to
    #[must_use]
    pub const fn new(s3_client: Arc<S3Client>, bucket_name: String, image_base_url: String) -> Self {
        Self {
            s3_client,
            bucket_name,
            image_base_url,
        }
    }

    /// Lists every object in the bucket, following continuation tokens
    async fn list_objects(&self) -> BucketResult<Vec<Object>> {
        let mut objects = Vec::new();
        let mut pages = self
            .s3_client
            .list_objects_v2()
            .bucket(&self.bucket_name)
            .into_paginator()
            .send();

        while let Some(page) = pages.next().await {
            objects.extend(page?.contents().iter().cloned());
        }

        Ok(objects)
    }

    async fn upload_one(&self, key: String, file: UploadedFile) -> BucketResult<()> {
        let size = file.data.len();

        let mut request = self
            .s3_client
            .put_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .body(ByteStream::from(file.data));
        if let Some(content_type) = file.content_type {
            request = request.content_type(content_type);
        }
        request.send().await?;

        debug!("Uploaded {} ({size} bytes) as {key}", file.file_name);
        Ok(())
    }

    async fn delete_keys(&self, keys: Vec<String>) -> BucketResult<()> {
        for chunk in keys.chunks(MAX_KEYS_PER_DELETE) {
            let objects = chunk
                .iter()
                .map(|key| ObjectIdentifier::builder().key(key).build())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|e| BucketError::InvalidInput(format!("Invalid object key: {e}")))?;

            let delete = Delete::builder()
                .set_objects(Some(objects))
                .quiet(true)
                .build()
                .map_err(|e| BucketError::S3Error(format!("Failed to build delete request: {e}")))?;

            let output = self
                .s3_client
                .delete_objects()
                .bucket(&self.bucket_name)
                .delete(delete)
                .send()
                .await?;

            if let Some(failed) = output.errors().first() {
                return Err(BucketError::S3Error(format!(
                    "Failed to delete {}: {}",
                    failed.key().unwrap_or_default(),
                    failed.message().unwrap_or_default()
                )));
            }
        }

        Ok(())
    }
}

fn created_on(object: &Object) -> Option<DateTime<Utc>> {
    let modified = object.last_modified()?;
    DateTime::from_timestamp(modified.secs(), modified.subsec_nanos())
}

#[async_trait]
impl ImageStore for MediaStorage {
    async fn list(&self) -> BucketResult<Vec<Url>> {
        self.list_objects()
            .await?
            .iter()
            .filter_map(Object::key)
            .map(|key| image_uri(&self.image_base_url, key))
            .collect()
    }

    async fn list_info(&self) -> BucketResult<Vec<BlobInfo>> {
        let objects = self.list_objects().await?;

        Ok(objects
            .iter()
            .filter_map(|object| {
                Some(BlobInfo {
                    name: object.key()?.to_string(),
                    size: object
                        .size()
                        .and_then(|size| u64::try_from(size).ok())
                        .unwrap_or(0),
                    created_on: created_on(object),
                })
            })
            .collect())
    }

    async fn upload(&self, files: Vec<UploadedFile>) -> BucketResult<()> {
        // One PutObject per key, so concurrent puts never race on the same object
        let keyed = keyed_files(files);
        let count = keyed.len();
        try_join_all(
            keyed
                .into_iter()
                .map(|(key, file)| self.upload_one(key, file)),
        )
        .await?;

        info!("Uploaded {count} images to bucket {}", self.bucket_name);
        Ok(())
    }

    async fn delete(&self, file_uri: &Url) -> BucketResult<()> {
        let key = object_key_from_uri(&self.image_base_url, file_uri)
            .ok_or_else(|| BucketError::InvalidInput(format!("No image in URI {file_uri}")))?;

        // Deleting a missing key succeeds in S3
        self.s3_client
            .delete_object()
            .bucket(&self.bucket_name)
            .key(&key)
            .send()
            .await?;

        info!("Deleted image {key} from bucket {}", self.bucket_name);
        Ok(())
    }

    async fn delete_all(&self) -> BucketResult<()> {
        let keys: Vec<String> = self
            .list_objects()
            .await?
            .iter()
            .filter_map(|object| object.key().map(ToString::to_string))
            .collect();
        let count = keys.len();

        self.delete_keys(keys).await?;

        info!("Deleted {count} images from bucket {}", self.bucket_name);
        Ok(())
    }
}
