//! Review persistence and the aggregates computed over it.

pub mod aggregate;
pub mod store;

pub use store::{ReviewStore, StoreError, REVIEWS_KEY};
