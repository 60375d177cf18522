//! In-memory implementation of [`ImageStore`] for tests

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use url::Url;

use super::{
    image_uri, keyed_files, object_key_from_uri, BlobInfo, BucketError, BucketResult, ImageStore,
    UploadedFile,
};

/// Base URL of images held by [`InMemoryImageStore`]
pub const MEMORY_BASE_URL: &str = "http://images.test/gallery";

#[derive(Debug, Clone)]
struct StoredImage {
    data: Vec<u8>,
    created_on: Option<DateTime<Utc>>,
}

/// Image store held in a process-local map
#[derive(Default)]
pub struct InMemoryImageStore {
    images: Mutex<BTreeMap<String, StoredImage>>,
    failing: AtomicBool,
    upload_calls: AtomicUsize,
}

impl InMemoryImageStore {
    /// Creates an empty store
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every operation fail until switched back off
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Number of times `upload` has been called
    pub fn upload_calls(&self) -> usize {
        self.upload_calls.load(Ordering::SeqCst)
    }

    /// Stores `size` zero bytes under `key` with an explicit creation time
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn insert(&self, key: &str, size: usize, created_on: Option<DateTime<Utc>>) {
        self.images.lock().unwrap().insert(
            key.to_string(),
            StoredImage {
                data: vec![0; size],
                created_on,
            },
        );
    }

    /// Stored keys in order
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn keys(&self) -> Vec<String> {
        self.images.lock().unwrap().keys().cloned().collect()
    }

    /// Contents of a stored image
    ///
    /// # Panics
    ///
    /// Panics if the internal lock is poisoned
    pub fn data(&self, key: &str) -> Option<Vec<u8>> {
        self.images
            .lock()
            .unwrap()
            .get(key)
            .map(|image| image.data.clone())
    }

    /// Public URI of a stored key
    ///
    /// # Panics
    ///
    /// Panics if the key does not form a valid URI
    pub fn uri_for(key: &str) -> Url {
        image_uri(MEMORY_BASE_URL, key).expect("memory base URL is valid")
    }

    fn images(&self) -> BucketResult<MutexGuard<'_, BTreeMap<String, StoredImage>>> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BucketError::UpstreamError(
                "in-memory image store is unavailable".to_string(),
            ));
        }
        self.images
            .lock()
            .map_err(|e| BucketError::S3Error(e.to_string()))
    }
}

#[async_trait]
impl ImageStore for InMemoryImageStore {
    async fn list(&self) -> BucketResult<Vec<Url>> {
        self.images()?
            .keys()
            .map(|key| image_uri(MEMORY_BASE_URL, key))
            .collect()
    }

    async fn list_info(&self) -> BucketResult<Vec<BlobInfo>> {
        Ok(self
            .images()?
            .iter()
            .map(|(key, image)| BlobInfo {
                name: key.clone(),
                size: image.data.len() as u64,
                created_on: image.created_on,
            })
            .collect())
    }

    async fn upload(&self, files: Vec<UploadedFile>) -> BucketResult<()> {
        self.upload_calls.fetch_add(1, Ordering::SeqCst);
        let mut images = self.images()?;

        for (key, file) in keyed_files(files) {
            images.insert(
                key,
                StoredImage {
                    data: file.data.to_vec(),
                    created_on: Some(Utc::now()),
                },
            );
        }

        Ok(())
    }

    async fn delete(&self, file_uri: &Url) -> BucketResult<()> {
        let key = object_key_from_uri(MEMORY_BASE_URL, file_uri)
            .ok_or_else(|| BucketError::InvalidInput(format!("No image in URI {file_uri}")))?;

        self.images()?.remove(&key);
        Ok(())
    }

    async fn delete_all(&self) -> BucketResult<()> {
        self.images()?.clear();
        Ok(())
    }
}
