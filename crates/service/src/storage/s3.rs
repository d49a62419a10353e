use std::sync::Arc;

use async_trait::async_trait;
use configs::StorageConfig;
use object_store::{aws::AmazonS3Builder, path::Path as ObjectPath, ObjectStore, PutPayload};
use tracing::debug;

use super::{check_key, listed_under, split_prefix, BlobError, BlobStore};

/// Blob store backed by an S3-compatible bucket (AWS, Scaleway, MinIO).
///
/// The object-store client is held behind `Arc<dyn ObjectStore>` so tests can
/// substitute `object_store::memory::InMemory` and still go through the same
/// error normalization.
#[derive(Clone)]
pub struct S3BlobStore {
    inner: Arc<dyn ObjectStore>,
    bucket: String,
}

impl S3BlobStore {
    /// Build a client from validated storage configuration.
    pub fn from_config(cfg: &StorageConfig) -> Result<Self, BlobError> {
        let store = AmazonS3Builder::new()
            .with_bucket_name(&cfg.bucket)
            .with_region(&cfg.region)
            .with_endpoint(&cfg.endpoint)
            .with_access_key_id(&cfg.access_key)
            .with_secret_access_key(&cfg.secret_key)
            .with_allow_http(cfg.endpoint.starts_with("http://"))
            .build()
            .map_err(|e| BlobError::Backend(format!("s3 client init: {e}")))?;
        debug!(bucket = %cfg.bucket, endpoint = %cfg.endpoint, region = %cfg.region, "s3 client configured");
        Ok(Self { inner: Arc::new(store), bucket: cfg.bucket.clone() })
    }

    pub fn from_object_store(inner: Arc<dyn ObjectStore>, bucket: impl Into<String>) -> Self {
        Self { inner, bucket: bucket.into() }
    }

    fn object_path(key: &str) -> Result<ObjectPath, BlobError> {
        check_key(key)?;
        ObjectPath::parse(key).map_err(|e| BlobError::Backend(format!("invalid object key `{key}`: {e}")))
    }

    fn backend_err(&self, op: &str, key: &str, e: object_store::Error) -> BlobError {
        BlobError::Backend(format!("s3 {op} s3://{}/{key}: {e}", self.bucket))
    }
}

#[async_trait]
impl BlobStore for S3BlobStore {
    async fn get_blob(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = Self::object_path(key)?;
        let result = match self.inner.get(&path).await {
            Ok(result) => result,
            Err(object_store::Error::NotFound { .. }) => {
                return Err(BlobError::NotFound(key.to_string()))
            }
            Err(e) => return Err(self.backend_err("get", key, e)),
        };
        match result.bytes().await {
            Ok(bytes) => Ok(bytes.to_vec()),
            // object deleted between head and body read
            Err(object_store::Error::NotFound { .. }) => Err(BlobError::NotFound(key.to_string())),
            Err(e) => Err(self.backend_err("get", key, e)),
        }
    }

    async fn put_blob(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        let path = Self::object_path(key)?;
        self.inner
            .put(&path, PutPayload::from(bytes))
            .await
            .map_err(|e| self.backend_err("put", key, e))?;
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        // Object-store listing is segment based: take the objects directly in
        // the directory part, then match the trailing fragment as a string.
        let (dir_part, _) = split_prefix(prefix);
        let dir = if dir_part.is_empty() { None } else { Some(Self::object_path(dir_part)?) };

        let listing = self
            .inner
            .list_with_delimiter(dir.as_ref())
            .await
            .map_err(|e| self.backend_err("list", prefix, e))?;

        let mut keys: Vec<String> = listing
            .objects
            .into_iter()
            .map(|meta| meta.location.to_string())
            .filter(|key| listed_under(key, prefix))
            .collect();
        keys.sort();
        Ok(keys)
    }

    fn kind(&self) -> &'static str {
        "s3"
    }
}
