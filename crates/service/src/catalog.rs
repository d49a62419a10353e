use std::sync::Arc;

use models::{catalog::is_valid_category, CatalogDocument};
use tracing::error;

use crate::errors::ServiceError;
use crate::storage::{BlobError, BlobStore};

const CATALOG_PREFIX: &str = "qa_";
const CATALOG_SUFFIX: &str = ".json";

/// Read-only view of the `qa_<category>.json` documents.
#[derive(Clone)]
pub struct CatalogReader {
    backend: Arc<dyn BlobStore>,
}

impl CatalogReader {
    pub fn new(backend: Arc<dyn BlobStore>) -> Self {
        Self { backend }
    }

    pub fn key_for(category: &str) -> String {
        format!("{CATALOG_PREFIX}{category}{CATALOG_SUFFIX}")
    }

    /// Category names with a catalog document, sorted.
    pub async fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
        let keys = self
            .backend
            .list_keys(CATALOG_PREFIX)
            .await
            .map_err(|e| ServiceError::Catalog(e.to_string()))?;
        let mut categories: Vec<String> = keys
            .iter()
            .filter_map(|k| k.strip_prefix(CATALOG_PREFIX))
            .filter_map(|k| k.strip_suffix(CATALOG_SUFFIX))
            .filter(|c| is_valid_category(c))
            .map(str::to_string)
            .collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// The document for one category.
    pub async fn document(&self, category: &str) -> Result<CatalogDocument, ServiceError> {
        if !is_valid_category(category) {
            return Err(ServiceError::not_found(&format!("category `{category}`")));
        }
        let key = Self::key_for(category);
        let bytes = match self.backend.get_blob(&key).await {
            Ok(bytes) => bytes,
            Err(BlobError::NotFound(_)) => {
                return Err(ServiceError::not_found(&format!("category `{category}`")))
            }
            Err(e) => return Err(ServiceError::Catalog(e.to_string())),
        };
        serde_json::from_slice(&bytes).map_err(|e| {
            error!(%key, error = %e, "catalog document is malformed");
            ServiceError::Catalog(format!("malformed catalog document {key}: {e}"))
        })
    }
}
