//! Runtime environment helpers
//!
//! Thin wrapper around `common::env` so the server only needs the storage
//! configuration to prepare its environment.

use configs::{BackendKind, StorageConfig};

/// Ensure the local data directory exists when the filesystem backend is selected.
pub async fn ensure_env(storage: &StorageConfig) -> anyhow::Result<()> {
    match storage.backend {
        BackendKind::Local => common::env::ensure_data_dir(&storage.base_dir).await,
        BackendKind::S3 => Ok(()),
    }
}
