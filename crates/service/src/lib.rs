//! Service layer for the review service.
//! - `storage`: interchangeable blob backends (local files, S3, in-memory).
//! - `reviews`: the append-only review collection and its aggregates.
//! - `catalog`: per-category question/answer documents.
//! - `review_service`: the boundary operations the HTTP layer calls.

pub mod errors;
pub mod runtime;
pub mod storage;
pub mod reviews;
pub mod catalog;
pub mod review_service;

pub use review_service::ReviewService;
