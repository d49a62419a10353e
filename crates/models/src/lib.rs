//! Domain types shared by the service and server crates.
//! - `review`: the stored review record and the inbound submission payload.
//! - `stats`: derived, never-persisted aggregate views.
//! - `catalog`: question/answer documents grouped by category.
//! - `timestamp`: lenient ISO-8601 parsing used by validation and aggregation.

pub mod errors;
pub mod review;
pub mod stats;
pub mod catalog;
pub mod timestamp;

pub use review::{ReviewRecord, ReviewSubmission};
pub use stats::{CategoryStat, DailyProgress, LeaderboardEntry};
pub use catalog::{CatalogDocument, QaPair};
