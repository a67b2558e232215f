//! # Object Storage
//!
//! Disk-backed buckets for product images, served under a public URL.
//!
//! ```text
//! objects_dir/
//! └── outfit_images/                    ← bucket
//!     ├── 1717171717171_kurta.png       ← object key
//!     └── 1717171723456_saree_red.jpg
//!
//! public_url("outfit_images", "1717171717171_kurta.png")
//!   = {public_base_url}/storage/v1/object/public/outfit_images/1717171717171_kurta.png
//! ```
//!
//! Uploads land in a temporary file first and are renamed into place, so a
//! reader never sees half an image.

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use ekaksha_core::validation::validate_object_key;
use ekaksha_core::ValidationError;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::{DbError, DbResult};

/// URL path segment between the base URL and the bucket name.
pub const PUBLIC_OBJECT_PATH: &str = "storage/v1/object/public";

const MAX_NAME_CHARS: usize = 200;

#[derive(Debug, Clone)]
pub struct ObjectStore {
    root: PathBuf,
    public_base_url: String,
}

impl ObjectStore {
    pub fn new(root: impl Into<PathBuf>, public_base_url: impl Into<String>) -> Self {
        let public_base_url = public_base_url.into().trim_end_matches('/').to_string();
        ObjectStore {
            root: root.into(),
            public_base_url,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Builds the key an upload is stored under: upload time in
    /// milliseconds, then the file name reduced to safe characters.
    ///
    /// ```rust
    /// use chrono::{TimeZone, Utc};
    /// use ekaksha_db::ObjectStore;
    ///
    /// let now = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
    /// assert_eq!(
    ///     ObjectStore::object_key_for("red saree.jpg", now),
    ///     "1700000000000_red_saree.jpg"
    /// );
    /// ```
    pub fn object_key_for(file_name: &str, now: DateTime<Utc>) -> String {
        format!("{}_{}", now.timestamp_millis(), sanitize_file_name(file_name))
    }

    /// Public URL of an object. Does not check that the object exists.
    pub fn public_url(&self, bucket: &str, key: &str) -> String {
        format!(
            "{}/{}/{}/{}",
            self.public_base_url, PUBLIC_OBJECT_PATH, bucket, key
        )
    }

    /// Stores `bytes` under `bucket/key`, replacing any previous object.
    /// Returns the key.
    pub async fn upload_object(&self, bucket: &str, key: &str, bytes: &[u8]) -> DbResult<String> {
        let path = self.object_path(bucket, key)?;
        let dir = self.root.join(bucket);
        debug!(bucket = %bucket, key = %key, size = bytes.len(), "Uploading object");

        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| storage_error("create bucket", bucket, e))?;

        // The temp name stays short so any valid key (up to 255 bytes) fits.
        let tmp = dir.join(format!(".{}.tmp", Uuid::new_v4()));
        if let Err(e) = write_then_rename(&tmp, &path, bytes).await {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(storage_error("upload", key, e));
        }

        info!(bucket = %bucket, key = %key, "Object uploaded");
        Ok(key.to_string())
    }

    pub async fn read_object(&self, bucket: &str, key: &str) -> DbResult<Vec<u8>> {
        let path = self.object_path(bucket, key)?;
        match tokio::fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(DbError::not_found("Object", format!("{}/{}", bucket, key)))
            }
            Err(e) => Err(storage_error("read", key, e)),
        }
    }

    /// Removes an object. Removing a missing object is not an error.
    pub async fn delete_object(&self, bucket: &str, key: &str) -> DbResult<()> {
        let path = self.object_path(bucket, key)?;
        debug!(bucket = %bucket, key = %key, "Deleting object");
        match tokio::fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(storage_error("delete", key, e)),
        }
    }

    fn object_path(&self, bucket: &str, key: &str) -> DbResult<PathBuf> {
        validate_object_key(bucket).map_err(|e| bad_name("bucket", e))?;
        validate_object_key(key).map_err(|e| bad_name("key", e))?;
        Ok(self.root.join(bucket).join(key))
    }
}

async fn write_then_rename(tmp: &Path, path: &Path, bytes: &[u8]) -> std::io::Result<()> {
    use tokio::io::AsyncWriteExt;

    let mut file = tokio::fs::File::create(tmp).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);
    tokio::fs::rename(tmp, path).await
}

fn sanitize_file_name(file_name: &str) -> String {
    let mut name: String = file_name
        .trim()
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                c
            } else {
                '_'
            }
        })
        .take(MAX_NAME_CHARS)
        .collect();

    while name.contains("..") {
        name = name.replace("..", ".");
    }
    let name = name.trim_start_matches('.');

    if name.is_empty() {
        "upload".to_string()
    } else {
        name.to_string()
    }
}

fn storage_error(action: &str, target: &str, err: std::io::Error) -> DbError {
    DbError::ObjectStorage(format!("{} '{}' failed: {}", action, target, err))
}

fn bad_name(what: &str, err: ValidationError) -> DbError {
    DbError::ObjectStorage(format!("invalid object {}: {}", what, err))
}
