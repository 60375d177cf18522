//! Blob storage for gallery images

mod error;
mod s3;

#[cfg(any(test, feature = "test-utils"))]
pub mod memory;

use std::borrow::Cow;

use async_trait::async_trait;
use axum::body::Bytes;
use chrono::{DateTime, Utc};
use percent_encoding::percent_decode_str;
use url::Url;

pub use error::{BucketError, BucketResult};
pub use s3::MediaStorage;

/// Metadata of a stored image
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlobInfo {
    /// Object key, equal to the image id
    pub name: String,
    /// Size in bytes
    pub size: u64,
    /// Creation timestamp, when the store reports one
    pub created_on: Option<DateTime<Utc>>,
}

/// A file received from an upload form
#[derive(Debug, Clone)]
pub struct UploadedFile {
    /// File name as sent by the client
    pub file_name: String,
    /// Content type as sent by the client
    pub content_type: Option<String>,
    /// File contents
    pub data: Bytes,
}

/// Image blob store used by the gallery handlers
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Public URIs of every stored image
    async fn list(&self) -> BucketResult<Vec<Url>>;

    /// Metadata of every stored image
    async fn list_info(&self) -> BucketResult<Vec<BlobInfo>>;

    /// Stores all given files
    async fn upload(&self, files: Vec<UploadedFile>) -> BucketResult<()>;

    /// Deletes the image behind `file_uri`; deleting a missing image succeeds
    async fn delete(&self, file_uri: &Url) -> BucketResult<()>;

    /// Deletes every stored image
    async fn delete_all(&self) -> BucketResult<()>;
}

/// Image id of a URI: its final non-empty path segment, percent-decoded
#[must_use]
pub fn image_id_from_uri(uri: &Url) -> Option<String> {
    let segment = uri
        .path_segments()?
        .next_back()
        .filter(|segment| !segment.is_empty())?;
    decode_segment(segment)
}

/// Object key an image URI points at, relative to `base_url`
///
/// Returns `None` when the URI is not served from `base_url` or names no object.
#[must_use]
pub fn object_key_from_uri(base_url: &str, uri: &Url) -> Option<String> {
    let base = Url::parse(base_url).ok()?;
    if base.origin() != uri.origin() {
        return None;
    }

    let mut segments = uri.path_segments()?;
    for expected in base.path_segments()?.filter(|segment| !segment.is_empty()) {
        if segments.next()? != expected {
            return None;
        }
    }

    let key = segments
        .map(decode_segment)
        .collect::<Option<Vec<_>>>()?;
    if key.is_empty() || key.iter().any(String::is_empty) {
        return None;
    }
    Some(key.join("/"))
}

fn decode_segment(segment: &str) -> Option<String> {
    percent_decode_str(segment)
        .decode_utf8()
        .ok()
        .map(Cow::into_owned)
}

/// Maps an uploaded file name to the object key it is stored under
///
/// Keys only contain `[A-Za-z0-9._-]`, so they survive as a URI path segment unchanged.
#[must_use]
pub fn object_key_for(file_name: &str) -> String {
    // Browsers on Windows may send the full client path
    let base_name = file_name.rsplit(['/', '\\']).next().unwrap_or_default();

    let key: String = base_name
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') {
                c
            } else {
                '_'
            }
        })
        .collect();

    if key.trim_matches('.').is_empty() {
        "image".to_string()
    } else {
        key
    }
}

/// Pairs files with their object keys, one file per key
///
/// Files whose names map to the same key keep the one sent last, in the
/// position of the first.
#[must_use]
pub fn keyed_files(files: Vec<UploadedFile>) -> Vec<(String, UploadedFile)> {
    let mut keyed: Vec<(String, UploadedFile)> = Vec::with_capacity(files.len());

    for file in files {
        let key = object_key_for(&file.file_name);
        match keyed.iter_mut().find(|(existing, _)| *existing == key) {
            Some(slot) => slot.1 = file,
            None => keyed.push((key, file)),
        }
    }

    keyed
}

/// Joins a base URL and an object key into the image URI
///
/// Every `/`-separated part of the key becomes one percent-encoded path segment.
///
/// # Errors
///
/// Returns `BucketError::ConfigError` if the base URL is not a valid URL
pub fn image_uri(base_url: &str, key: &str) -> BucketResult<Url> {
    let mut uri = Url::parse(base_url)
        .map_err(|e| BucketError::ConfigError(format!("Invalid image base URL {base_url}: {e}")))?;

    uri.path_segments_mut()
        .map_err(|()| BucketError::ConfigError(format!("Image base URL {base_url} has no path")))?
        .pop_if_empty()
        .extend(key.split('/'));

    Ok(uri)
}
