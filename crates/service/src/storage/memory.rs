use std::{
    collections::BTreeMap,
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{listed_under, BlobError, BlobStore};

/// In-process blob store used as a test double and for ephemeral runs.
///
/// `set_failing(true)` makes every operation return [`BlobError::Backend`],
/// which lets callers exercise the error paths of the layers above.
#[derive(Clone, Default)]
pub struct MemoryBlobStore {
    inner: Arc<RwLock<BTreeMap<String, Vec<u8>>>>,
    failing: Arc<AtomicBool>,
}

impl MemoryBlobStore {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    fn check_available(&self) -> Result<(), BlobError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(BlobError::Backend("memory backend unavailable".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn get_blob(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        self.check_available()?;
        let map = self.inner.read().await;
        map.get(key)
            .cloned()
            .ok_or_else(|| BlobError::NotFound(key.to_string()))
    }

    async fn put_blob(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        self.check_available()?;
        let mut map = self.inner.write().await;
        map.insert(key.to_string(), bytes);
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        self.check_available()?;
        let map = self.inner.read().await;
        Ok(map.keys().filter(|k| listed_under(k, prefix)).cloned().collect())
    }

    fn kind(&self) -> &'static str {
        "memory"
    }
}
