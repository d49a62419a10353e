use std::sync::Arc;

use common::metrics::{BACKEND_ERRORS_TOTAL, DISCARDED_BLOBS_TOTAL, REVIEWS_APPENDED_TOTAL, SKIPPED_RECORDS_TOTAL};
use models::ReviewRecord;
use serde_json::Value;
use thiserror::Error;
use tracing::{debug, warn};

use crate::storage::{BlobError, BlobStore};

/// Logical key of the review collection blob.
pub const REVIEWS_KEY: &str = "reviews.json";

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Backend(#[from] BlobError),
    #[error("failed to encode review collection: {0}")]
    Encode(String),
}

/// Owner of the review collection: one JSON array under [`REVIEWS_KEY`].
///
/// `append` is a read-modify-write of the whole blob with no lock around the
/// pair. Concurrent appends race and the later write wins.
#[derive(Clone)]
pub struct ReviewStore {
    backend: Arc<dyn BlobStore>,
    key: String,
}

impl ReviewStore {
    pub fn new(backend: Arc<dyn BlobStore>) -> Self {
        Self::with_key(backend, REVIEWS_KEY)
    }

    pub fn with_key(backend: Arc<dyn BlobStore>, key: impl Into<String>) -> Self {
        Self { backend, key: key.into() }
    }

    /// Append one record at the end of the collection and persist the whole array.
    ///
    /// Elements that do not decode as records are written back untouched.
    pub async fn append(&self, record: ReviewRecord) -> Result<(), StoreError> {
        let mut items = self.load_items().await?;
        items.push(serde_json::to_value(&record).map_err(|e| StoreError::Encode(e.to_string()))?);

        let data = serde_json::to_vec_pretty(&items).map_err(|e| StoreError::Encode(e.to_string()))?;
        if let Err(e) = self.backend.put_blob(&self.key, data).await {
            BACKEND_ERRORS_TOTAL.with_label_values(&["put"]).inc();
            return Err(e.into());
        }
        REVIEWS_APPENDED_TOTAL.inc();
        debug!(key = %self.key, total = items.len(), "review appended");
        Ok(())
    }

    /// Every stored record in append order. Missing or unreadable data is an
    /// empty collection; only genuine backend failures are errors.
    pub async fn read_all(&self) -> Result<Vec<ReviewRecord>, StoreError> {
        let items = self.load_items().await?;
        Ok(decode_records(&self.key, items))
    }

    async fn load_items(&self) -> Result<Vec<Value>, StoreError> {
        match self.backend.get_blob(&self.key).await {
            Ok(bytes) => Ok(decode_items(&self.key, &bytes)),
            Err(BlobError::NotFound(_)) => Ok(Vec::new()),
            Err(e) => {
                BACKEND_ERRORS_TOTAL.with_label_values(&["get"]).inc();
                Err(e.into())
            }
        }
    }
}

/// Raw elements of a stored collection; invalid JSON or a non-array
/// document is discarded as an empty collection.
fn decode_items(key: &str, bytes: &[u8]) -> Vec<Value> {
    let value: Value = match serde_json::from_slice(bytes) {
        Ok(v) => v,
        Err(e) => {
            DISCARDED_BLOBS_TOTAL.with_label_values(&["invalid_json"]).inc();
            warn!(%key, error = %e, "stored review collection is not valid JSON; treating as empty");
            return Vec::new();
        }
    };

    match value {
        Value::Array(items) => items,
        other => {
            DISCARDED_BLOBS_TOTAL.with_label_values(&["not_a_list"]).inc();
            warn!(%key, found = json_kind(&other), "stored review collection is not a list; treating as empty");
            Vec::new()
        }
    }
}

/// Elements that are not review records are skipped individually.
fn decode_records(key: &str, items: Vec<Value>) -> Vec<ReviewRecord> {
    let mut records = Vec::with_capacity(items.len());
    for (index, item) in items.into_iter().enumerate() {
        match serde_json::from_value::<ReviewRecord>(item) {
            Ok(rec) => records.push(rec),
            Err(e) => {
                SKIPPED_RECORDS_TOTAL.inc();
                warn!(%key, index, error = %e, "skipping undecodable review record");
            }
        }
    }
    records
}

fn json_kind(v: &Value) -> &'static str {
    match v {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    fn record(user: &str, category: &str) -> ReviewRecord {
        ReviewRecord {
            user: user.into(),
            question: "What does GROUP BY do?".into(),
            answer: "Buckets rows sharing a key.".into(),
            question_rating: 4,
            answer_rating: 3,
            comment: None,
            timestamp: Some("2025-06-08T10:45:35.123Z".into()),
            category: Some(category.into()),
        }
    }

    fn setup() -> (Arc<MemoryBlobStore>, ReviewStore) {
        let backend = MemoryBlobStore::new();
        let store = ReviewStore::new(backend.clone());
        (backend, store)
    }

    #[tokio::test]
    async fn never_written_store_reads_empty() -> Result<(), anyhow::Error> {
        let (_, store) = setup();
        assert!(store.read_all().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn append_then_read_returns_record_last() -> Result<(), anyhow::Error> {
        let (_, store) = setup();
        store.append(record("alice", "sql")).await?;
        let before = store.read_all().await?.len();

        let r = record("bob", "python");
        store.append(r.clone()).await?;

        let all = store.read_all().await?;
        assert_eq!(all.len(), before + 1);
        assert_eq!(all.last(), Some(&r));
        assert_eq!(all[0].user, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_json_reads_empty_and_is_overwritten_on_append() -> Result<(), anyhow::Error> {
        let (backend, store) = setup();
        backend.put_blob(REVIEWS_KEY, b"{not json".to_vec()).await?;
        assert!(store.read_all().await?.is_empty());

        store.append(record("alice", "sql")).await?;
        let all = store.read_all().await?;
        assert_eq!(all.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn non_list_document_reads_empty() -> Result<(), anyhow::Error> {
        let (backend, store) = setup();
        backend.put_blob(REVIEWS_KEY, br#"{"user":"alice"}"#.to_vec()).await?;
        assert!(store.read_all().await?.is_empty());

        store.append(record("alice", "sql")).await?;
        assert_eq!(store.read_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn undecodable_elements_are_skipped() -> Result<(), anyhow::Error> {
        let (backend, store) = setup();
        let good = serde_json::to_value(record("alice", "sql"))?;
        let blob = serde_json::to_vec(&serde_json::json!([good, 42, {"user": "x"}]))?;
        backend.put_blob(REVIEWS_KEY, blob).await?;

        let all = store.read_all().await?;
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].user, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn append_keeps_undecodable_elements() -> Result<(), anyhow::Error> {
        let (backend, store) = setup();
        let good = serde_json::to_value(record("alice", "sql"))?;
        let blob = serde_json::to_vec(&serde_json::json!([good, 42, {"user": "x"}]))?;
        backend.put_blob(REVIEWS_KEY, blob).await?;

        store.append(record("bob", "python")).await?;

        let raw: Value = serde_json::from_slice(&backend.get_blob(REVIEWS_KEY).await?)?;
        let items = raw.as_array().expect("array");
        assert_eq!(items.len(), 4);
        assert_eq!(items[1], serde_json::json!(42));
        assert_eq!(items[2], serde_json::json!({"user": "x"}));

        let users: Vec<String> = store.read_all().await?.into_iter().map(|r| r.user).collect();
        assert_eq!(users, vec!["alice", "bob"]);
        Ok(())
    }

    #[tokio::test]
    async fn read_all_is_idempotent() -> Result<(), anyhow::Error> {
        let (_, store) = setup();
        store.append(record("alice", "sql")).await?;
        store.append(record("bob", "sql")).await?;
        assert_eq!(store.read_all().await?, store.read_all().await?);
        Ok(())
    }

    #[tokio::test]
    async fn backend_errors_propagate() -> Result<(), anyhow::Error> {
        let (backend, store) = setup();
        store.append(record("alice", "sql")).await?;
        backend.set_failing(true);

        assert!(matches!(store.read_all().await, Err(StoreError::Backend(BlobError::Backend(_)))));
        assert!(store.append(record("bob", "sql")).await.is_err());

        backend.set_failing(false);
        assert_eq!(store.read_all().await?.len(), 1);
        Ok(())
    }

    #[tokio::test]
    async fn stored_blob_is_a_pretty_json_array() -> Result<(), anyhow::Error> {
        let (backend, store) = setup();
        store.append(record("alice", "sql")).await?;
        let raw = backend.get_blob(REVIEWS_KEY).await?;
        let text = String::from_utf8(raw)?;
        assert!(text.starts_with("[\n  {"));
        let parsed: Vec<ReviewRecord> = serde_json::from_str(&text)?;
        assert_eq!(parsed, vec![record("alice", "sql")]);
        Ok(())
    }

    #[tokio::test]
    async fn works_over_the_filesystem_backend() -> Result<(), anyhow::Error> {
        let dir = std::env::temp_dir().join(format!("review_store_{}", uuid::Uuid::new_v4()));
        let backend = crate::storage::FsBlobStore::new(&dir).await?;
        let store = ReviewStore::new(backend);
        store.append(record("alice", "sql")).await?;

        let reopened = ReviewStore::new(crate::storage::FsBlobStore::new(&dir).await?);
        assert_eq!(reopened.read_all().await?, vec![record("alice", "sql")]);
        let _ = tokio::fs::remove_dir_all(&dir).await;
        Ok(())
    }
}
