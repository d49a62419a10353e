use thiserror::Error;

use crate::reviews::StoreError;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("review store error: {0}")]
    Store(#[from] StoreError),
    #[error("catalog error: {0}")]
    Catalog(String),
    #[error("model error: {0}")]
    Model(#[from] models::errors::ModelError),
}

impl ServiceError {
    pub fn not_found(entity: &str) -> Self { Self::NotFound(format!("{} not found", entity)) }
}
