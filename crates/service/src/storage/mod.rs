//! Storage abstractions for service layer
//!
//! A [`BlobStore`] holds opaque named byte payloads addressed by logical keys
//! such as `reviews.json` or `qa_sql.json`. Every backend presents the same
//! semantics:
//! - a missing blob is always [`BlobError::NotFound`], whatever the native
//!   signal (missing file, missing object);
//! - `put_blob` fully replaces prior content at the key;
//! - `list_keys` returns an empty vec, not an error, when nothing matches;
//!   it is shallow: only keys directly inside the prefix's directory, never
//!   keys nested below it and never dot-named entries.

pub mod fs;
pub mod memory;
pub mod s3;

use std::sync::Arc;

use async_trait::async_trait;
use configs::{BackendKind, StorageConfig};
use thiserror::Error;
use tracing::info;

pub use fs::FsBlobStore;
pub use memory::MemoryBlobStore;
pub use s3::S3BlobStore;

#[derive(Debug, Error)]
pub enum BlobError {
    #[error("blob not found: {0}")]
    NotFound(String),
    #[error("storage backend error: {0}")]
    Backend(String),
}

impl BlobError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, BlobError::NotFound(_))
    }
}

/// Trait abstraction for raw blob storage.
/// Implementations can be file-backed, object-store-backed, or in-memory.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Fetch the full content stored at `key`.
    async fn get_blob(&self, key: &str) -> Result<Vec<u8>, BlobError>;

    /// Create or overwrite the content at `key`.
    async fn put_blob(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError>;

    /// Keys starting with `prefix` that sit directly in its directory, sorted.
    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BlobError>;

    /// Short backend label for logs.
    fn kind(&self) -> &'static str;
}

/// Reject keys that could escape the key space of a backend.
pub(crate) fn check_key(key: &str) -> Result<(), BlobError> {
    if key.is_empty()
        || key.starts_with('/')
        || key.contains('\\')
        || key.split('/').any(|seg| seg.is_empty() || seg == "." || seg == "..")
    {
        return Err(BlobError::Backend(format!("invalid blob key `{key}`")));
    }
    Ok(())
}

/// Split a listing prefix into its directory part and the leading fragment
/// of the final segment: `a/b/qa_` -> (`a/b`, `qa_`).
pub(crate) fn split_prefix(prefix: &str) -> (&str, &str) {
    match prefix.rfind('/') {
        Some(idx) => (&prefix[..idx], &prefix[idx + 1..]),
        None => ("", prefix),
    }
}

/// Whether `key` belongs in a shallow listing of `prefix`: it starts with the
/// prefix, has no further `/` after it, and its last segment is not dot-named.
pub(crate) fn listed_under(key: &str, prefix: &str) -> bool {
    let Some(rest) = key.strip_prefix(prefix) else {
        return false;
    };
    if rest.contains('/') {
        return false;
    }
    let name = key.rsplit('/').next().unwrap_or(key);
    !name.starts_with('.')
}

/// Build the backend selected by configuration.
pub async fn build_backend(cfg: &StorageConfig) -> Result<Arc<dyn BlobStore>, BlobError> {
    let backend: Arc<dyn BlobStore> = match cfg.backend {
        BackendKind::Local => FsBlobStore::new(&cfg.base_dir).await?,
        BackendKind::S3 => Arc::new(S3BlobStore::from_config(cfg)?),
    };
    info!(backend = backend.kind(), "storage backend initialized");
    Ok(backend)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_checks() {
        assert!(check_key("reviews.json").is_ok());
        assert!(check_key("catalog/qa_sql.json").is_ok());
        assert!(check_key("").is_err());
        assert!(check_key("/etc/passwd").is_err());
        assert!(check_key("../reviews.json").is_err());
        assert!(check_key("a//b").is_err());
    }

    #[test]
    fn prefix_split() {
        assert_eq!(split_prefix("qa_"), ("", "qa_"));
        assert_eq!(split_prefix("catalog/qa_"), ("catalog", "qa_"));
        assert_eq!(split_prefix(""), ("", ""));
    }

    #[test]
    fn shallow_listing_rule() {
        assert!(listed_under("qa_sql.json", "qa_"));
        assert!(listed_under("qa_sql.json", ""));
        assert!(listed_under("nested/qa_rust.json", "nested/"));
        assert!(!listed_under("nested/qa_rust.json", ""));
        assert!(!listed_under("qa_extra/x.json", "qa_"));
        assert!(!listed_under(".qa_sql.json.tmp", ""));
        assert!(!listed_under("reviews.json", "qa_"));
    }

    async fn seed(store: &dyn BlobStore) -> Result<(), BlobError> {
        for key in ["qa_sql.json", "qa_python.json", "reviews.json", "nested/qa_rust.json", "qa_extra/x.json"] {
            store.put_blob(key, b"{}".to_vec()).await?;
        }
        Ok(())
    }

    #[tokio::test]
    async fn every_backend_lists_the_same_keys() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("blob_listing_{}", uuid::Uuid::new_v4()));
        let backends: Vec<Arc<dyn BlobStore>> = vec![
            FsBlobStore::new(&dir).await?,
            Arc::new(S3BlobStore::from_object_store(
                Arc::new(object_store::memory::InMemory::new()),
                "test-bucket",
            )),
            MemoryBlobStore::new(),
        ];

        for backend in &backends {
            seed(backend.as_ref()).await?;
            let kind = backend.kind();
            assert_eq!(
                backend.list_keys("").await?,
                vec!["qa_python.json", "qa_sql.json", "reviews.json"],
                "{kind}"
            );
            assert_eq!(backend.list_keys("qa_").await?, vec!["qa_python.json", "qa_sql.json"], "{kind}");
            assert_eq!(backend.list_keys("nested/").await?, vec!["nested/qa_rust.json"], "{kind}");
            assert_eq!(backend.list_keys("qa_extra/").await?, vec!["qa_extra/x.json"], "{kind}");
            assert!(backend.list_keys("nested").await?.is_empty(), "{kind}");
            assert!(backend.list_keys("absent/").await?.is_empty(), "{kind}");
        }

        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn factory_builds_local_backend() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("blob_factory_{}", uuid::Uuid::new_v4()));
        let cfg = StorageConfig {
            base_dir: dir.to_string_lossy().into_owned(),
            ..StorageConfig::default()
        };
        let backend = build_backend(&cfg).await?;
        assert_eq!(backend.kind(), "local");
        assert!(backend.get_blob("reviews.json").await.unwrap_err().is_not_found());
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
