//! Object storage access (S3 compatible).
//!
//! One [`ObjectStorage`] wraps one bucket. Listing applies the configured
//! prefix as a plain string prefix, the way S3 does, rather than the
//! path-segment prefix `object_store` uses.

use bytes::Bytes;
use futures::TryStreamExt;
use object_store::{aws::AmazonS3Builder, path::Path as ObjectPath, ObjectStore};
use serde::Serialize;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, instrument};

use crate::config::StorageConfig;
use crate::error::{IngestError, Result};

/// Object storage client for one bucket
pub struct ObjectStorage {
    store: Arc<dyn ObjectStore>,
    bucket: String,
}

impl ObjectStorage {
    /// Wrap an existing store (in-memory stores in tests, for instance)
    pub fn new(store: Arc<dyn ObjectStore>, bucket: &str) -> Self {
        Self {
            store,
            bucket: bucket.to_string(),
        }
    }

    /// Create an S3 client for `bucket` from config
    pub fn s3(config: &StorageConfig, bucket: &str) -> Result<Self> {
        let mut builder = AmazonS3Builder::from_env()
            .with_bucket_name(bucket)
            .with_region(&config.region);

        if let Some(endpoint) = &config.endpoint {
            builder = builder.with_endpoint(endpoint);
        }
        if config.allow_http {
            builder = builder.with_allow_http(true);
        }

        let store = builder
            .build()
            .map_err(|e| IngestError::storage("connect", bucket, e))?;

        Ok(Self::new(Arc::new(store), bucket))
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// List keys starting with `prefix`
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        // Only whole path segments can be pushed down as a prefix; the rest
        // narrows the listing through the start-after offset
        let parent = match prefix.rsplit_once('/') {
            Some((dir, _)) => Some(parse_key("list", dir)?),
            None => None,
        };
        let mut stream = match list_offset(prefix) {
            Some(offset) => {
                let offset = parse_key("list", offset)?;
                self.store.list_with_offset(parent.as_ref(), &offset)
            }
            None => self.store.list(parent.as_ref()),
        };

        let mut keys = Vec::new();
        while let Some(meta) = stream
            .try_next()
            .await
            .map_err(|e| IngestError::storage("list", prefix, e))?
        {
            let key = meta.location.to_string();
            if key.starts_with(prefix) {
                debug!(key = %key, size = meta.size, "Found candidate object");
                keys.push(key);
            }
        }

        Ok(keys)
    }

    /// The lexicographically greatest key under `prefix`
    pub async fn latest_key(&self, prefix: &str) -> Result<String> {
        let keys = self.list(prefix).await?;
        info!(bucket = %self.bucket, prefix = prefix, count = keys.len(), "Listed source objects");

        keys.into_iter()
            .max()
            .ok_or_else(|| IngestError::SourceNotFound {
                bucket: self.bucket.clone(),
                prefix: prefix.to_string(),
            })
    }

    /// Read an object fully into memory
    #[instrument(skip(self), fields(bucket = %self.bucket))]
    pub async fn get(&self, key: &str) -> Result<Bytes> {
        let location = parse_key("download", key)?;

        let result = self
            .store
            .get(&location)
            .await
            .map_err(|e| IngestError::storage("download", key, e))?;

        let bytes = result
            .bytes()
            .await
            .map_err(|e| IngestError::storage("download", key, e))?;

        debug!(size = bytes.len(), "Read object");
        Ok(bytes)
    }

    /// Download `key` to `<staging_dir>/<key>`, creating directories as needed
    pub async fn download_to(&self, key: &str, staging_dir: &Path) -> Result<PathBuf> {
        let bytes = self.get(key).await?;

        let local_path = staging_dir.join(key);
        if let Some(parent) = local_path.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&local_path, &bytes).await?;

        info!(
            bucket = %self.bucket,
            key = key,
            local_path = %local_path.display(),
            size = bytes.len(),
            "Downloaded source file"
        );
        Ok(local_path)
    }

    /// Write bytes to `key`, replacing any existing object
    #[instrument(skip(self, data), fields(bucket = %self.bucket))]
    pub async fn put(&self, key: &str, data: Bytes) -> Result<()> {
        let location = parse_key("upload", key)?;
        debug!(size = data.len(), "Writing object");

        self.store
            .put(&location, data.into())
            .await
            .map_err(|e| IngestError::storage("upload", key, e))?;

        Ok(())
    }

    /// Serialize `value` as JSON and write it to `key` in a single put
    pub async fn put_json<T: Serialize>(&self, key: &str, value: &T) -> Result<()> {
        let body = serde_json::to_vec(value)?;
        self.put(key, Bytes::from(body)).await
    }
}

/// Keys are used verbatim; listed locations are already encoded
fn parse_key(operation: &str, key: &str) -> Result<ObjectPath> {
    ObjectPath::parse(key).map_err(|e| IngestError::storage(operation, key, e))
}

/// Start-after offset for a string prefix: the prefix without its last
/// character, so every key starting with the prefix sorts after it
fn list_offset(prefix: &str) -> Option<&str> {
    let (last, _) = prefix.char_indices().last()?;
    let offset = prefix[..last].trim_end_matches('/');
    (!offset.is_empty()).then_some(offset)
}

/// Output key for a source key: the `.nc` suffix becomes `.json`
pub fn output_key(source_key: &str) -> String {
    let stem = source_key.strip_suffix(".nc").unwrap_or(source_key);
    format!("{}.json", stem)
}
