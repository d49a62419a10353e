use std::{io::ErrorKind, path::PathBuf, sync::Arc};

use async_trait::async_trait;
use tokio::fs;
use uuid::Uuid;

use super::{check_key, listed_under, split_prefix, BlobError, BlobStore};

/// Blob store rooted at a local directory; each key is a file path relative to it.
#[derive(Clone, Debug)]
pub struct FsBlobStore {
    base_dir: PathBuf,
}

impl FsBlobStore {
    /// Initialize the store at `base_dir`, creating the directory if missing.
    pub async fn new<P: Into<PathBuf>>(base_dir: P) -> Result<Arc<Self>, BlobError> {
        let base_dir = base_dir.into();
        fs::create_dir_all(&base_dir)
            .await
            .map_err(|e| BlobError::Backend(format!("cannot create {}: {e}", base_dir.display())))?;
        Ok(Arc::new(Self { base_dir }))
    }

    fn path_for(&self, key: &str) -> Result<PathBuf, BlobError> {
        check_key(key)?;
        Ok(self.base_dir.join(key))
    }
}

#[async_trait]
impl BlobStore for FsBlobStore {
    async fn get_blob(&self, key: &str) -> Result<Vec<u8>, BlobError> {
        let path = self.path_for(key)?;
        match fs::read(&path).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == ErrorKind::NotFound => Err(BlobError::NotFound(key.to_string())),
            Err(e) => Err(BlobError::Backend(format!("read {}: {e}", path.display()))),
        }
    }

    async fn put_blob(&self, key: &str, bytes: Vec<u8>) -> Result<(), BlobError> {
        let path = self.path_for(key)?;
        let parent = path.parent().unwrap_or(self.base_dir.as_path()).to_path_buf();
        fs::create_dir_all(&parent)
            .await
            .map_err(|e| BlobError::Backend(format!("create {}: {e}", parent.display())))?;

        // Write a sibling temp file then rename over the target so a reader
        // sees either the old blob or the new one.
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let tmp = parent.join(format!(".{file_name}.{}.tmp", Uuid::new_v4()));
        if let Err(e) = fs::write(&tmp, &bytes).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(BlobError::Backend(format!("write {}: {e}", tmp.display())));
        }
        if let Err(e) = fs::rename(&tmp, &path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(BlobError::Backend(format!("rename into {}: {e}", path.display())));
        }
        Ok(())
    }

    async fn list_keys(&self, prefix: &str) -> Result<Vec<String>, BlobError> {
        let (dir_part, _) = split_prefix(prefix);
        let dir = if dir_part.is_empty() {
            self.base_dir.clone()
        } else {
            check_key(dir_part)?;
            self.base_dir.join(dir_part)
        };

        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(BlobError::Backend(format!("list {}: {e}", dir.display()))),
        };

        let mut keys = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| BlobError::Backend(format!("list {}: {e}", dir.display())))?
        {
            let is_file = entry
                .file_type()
                .await
                .map(|t| t.is_file())
                .unwrap_or(false);
            if !is_file {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let key = if dir_part.is_empty() { name } else { format!("{dir_part}/{name}") };
            // in-flight temp files are dot-named and stay hidden
            if listed_under(&key, prefix) {
                keys.push(key);
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn kind(&self) -> &'static str {
        "local"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tmp_dir() -> PathBuf {
        std::env::temp_dir().join(format!("fs_blob_store_{}", Uuid::new_v4()))
    }

    #[tokio::test]
    async fn missing_file_is_not_found() -> Result<(), anyhow::Error> {
        let dir = tmp_dir();
        let store = FsBlobStore::new(&dir).await?;
        let err = store.get_blob("reviews.json").await.unwrap_err();
        assert!(err.is_not_found());
        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn put_overwrites_and_leaves_no_temp_files() -> Result<(), anyhow::Error> {
        let dir = tmp_dir();
        let store = FsBlobStore::new(&dir).await?;

        store.put_blob("reviews.json", b"[1,2,3]".to_vec()).await?;
        store.put_blob("reviews.json", b"[]".to_vec()).await?;
        assert_eq!(store.get_blob("reviews.json").await?, b"[]".to_vec());

        // reload from disk through a fresh handle
        let reopened = FsBlobStore::new(&dir).await?;
        assert_eq!(reopened.get_blob("reviews.json").await?, b"[]".to_vec());
        assert_eq!(reopened.list_keys("").await?, vec!["reviews.json".to_string()]);

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn list_filters_by_prefix() -> Result<(), anyhow::Error> {
        let dir = tmp_dir();
        let store = FsBlobStore::new(&dir).await?;
        store.put_blob("qa_sql.json", b"{}".to_vec()).await?;
        store.put_blob("qa_python.json", b"{}".to_vec()).await?;
        store.put_blob("reviews.json", b"[]".to_vec()).await?;
        store.put_blob("nested/qa_rust.json", b"{}".to_vec()).await?;

        assert_eq!(
            store.list_keys("qa_").await?,
            vec!["qa_python.json".to_string(), "qa_sql.json".to_string()]
        );
        assert_eq!(store.list_keys("nested/qa_").await?, vec!["nested/qa_rust.json".to_string()]);
        assert!(store.list_keys("zzz").await?.is_empty());
        assert!(store.list_keys("absent/").await?.is_empty());

        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn escaping_keys_are_rejected() -> Result<(), anyhow::Error> {
        let dir = tmp_dir();
        let store = FsBlobStore::new(&dir).await?;
        let err = store.put_blob("../outside.json", b"x".to_vec()).await.unwrap_err();
        assert!(matches!(err, BlobError::Backend(_)));
        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }

    #[tokio::test]
    async fn reading_a_directory_is_a_backend_error() -> Result<(), anyhow::Error> {
        let dir = tmp_dir();
        let store = FsBlobStore::new(&dir).await?;
        fs::create_dir_all(dir.join("reviews.json")).await?;
        let err = store.get_blob("reviews.json").await.unwrap_err();
        assert!(!err.is_not_found());
        let _ = fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
