use std::sync::Arc;

use chrono::{NaiveDate, Utc};
use models::{CatalogDocument, CategoryStat, DailyProgress, LeaderboardEntry, ReviewRecord, ReviewSubmission};
use tracing::info;

use crate::catalog::CatalogReader;
use crate::errors::ServiceError;
use crate::reviews::{aggregate, ReviewStore};
use crate::storage::BlobStore;

/// Boundary operations exposed to the transport layer.
#[derive(Clone)]
pub struct ReviewService {
    store: ReviewStore,
    catalog: CatalogReader,
}

impl ReviewService {
    pub fn new(backend: Arc<dyn BlobStore>) -> Self {
        Self {
            store: ReviewStore::new(Arc::clone(&backend)),
            catalog: CatalogReader::new(backend),
        }
    }

    /// Validate and persist one review.
    pub async fn submit_review(&self, submission: ReviewSubmission) -> Result<ReviewRecord, ServiceError> {
        let record = submission.validate()?;
        self.store.append(record.clone()).await?;
        info!(user = %record.user, category = record.category.as_deref().unwrap_or_default(), "review saved");
        Ok(record)
    }

    pub async fn list_reviews(&self) -> Result<Vec<ReviewRecord>, ServiceError> {
        Ok(self.store.read_all().await?)
    }

    pub async fn category_stats(&self) -> Result<Vec<CategoryStat>, ServiceError> {
        let records = self.store.read_all().await?;
        Ok(aggregate::category_stats(&records))
    }

    /// Reviews by `user` on `date` (today in UTC when `None`).
    pub async fn user_daily_progress(
        &self,
        user: &str,
        date: Option<NaiveDate>,
    ) -> Result<DailyProgress, ServiceError> {
        let date = date.unwrap_or_else(|| Utc::now().date_naive());
        let records = self.store.read_all().await?;
        Ok(DailyProgress {
            user: user.to_string(),
            date,
            daily_count: aggregate::daily_progress(&records, user, date),
        })
    }

    pub async fn leaderboard(&self) -> Result<Vec<LeaderboardEntry>, ServiceError> {
        let records = self.store.read_all().await?;
        Ok(aggregate::leaderboard(&records))
    }

    pub async fn list_categories(&self) -> Result<Vec<String>, ServiceError> {
        self.catalog.list_categories().await
    }

    pub async fn qa_pairs(&self, category: &str) -> Result<CatalogDocument, ServiceError> {
        self.catalog.document(category).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryBlobStore;

    fn submission(user: &str, category: &str, ts: &str) -> ReviewSubmission {
        ReviewSubmission {
            user: user.into(),
            question: "Explain ownership".into(),
            answer: "Each value has one owner.".into(),
            question_rating: 5,
            answer_rating: 4,
            comment: Some("clear".into()),
            timestamp: ts.into(),
            category: category.into(),
        }
    }

    #[tokio::test]
    async fn submit_then_aggregate() -> Result<(), anyhow::Error> {
        let svc = ReviewService::new(MemoryBlobStore::new());
        svc.submit_review(submission("alice", "rust", "2025-06-08T10:45:35.123Z")).await?;
        svc.submit_review(submission("alice", "rust", "2025-06-08T11:00:00Z")).await?;
        svc.submit_review(submission("bob", "sql", "2025-06-07T11:00:00Z")).await?;

        assert_eq!(svc.list_reviews().await?.len(), 3);

        let stats = svc.category_stats().await?;
        assert_eq!(stats[0], CategoryStat { category: "rust".into(), count: 2 });

        let date = NaiveDate::from_ymd_opt(2025, 6, 8);
        let progress = svc.user_daily_progress("alice", date).await?;
        assert_eq!(progress.daily_count, 2);
        assert_eq!(svc.user_daily_progress("bob", date).await?.daily_count, 0);

        let board = svc.leaderboard().await?;
        assert_eq!(board[0].user, "alice");
        Ok(())
    }

    #[tokio::test]
    async fn invalid_submission_is_not_stored() -> Result<(), anyhow::Error> {
        let svc = ReviewService::new(MemoryBlobStore::new());
        let err = svc.submit_review(submission("", "rust", "2025-06-08")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Model(_)));
        assert!(svc.list_reviews().await?.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn progress_defaults_to_today() -> Result<(), anyhow::Error> {
        let svc = ReviewService::new(MemoryBlobStore::new());
        let now = Utc::now().to_rfc3339();
        svc.submit_review(submission("alice", "rust", &now)).await?;
        let progress = svc.user_daily_progress("alice", None).await?;
        assert_eq!(progress.date, Utc::now().date_naive());
        // a submission straddling midnight could land on the previous day
        assert!(progress.daily_count <= 1);
        Ok(())
    }

    #[tokio::test]
    async fn store_failure_surfaces() {
        let backend = MemoryBlobStore::new();
        let svc = ReviewService::new(backend.clone());
        backend.set_failing(true);
        let err = svc
            .submit_review(submission("alice", "rust", "2025-06-08"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Store(_)));
        assert!(svc.category_stats().await.is_err());
    }
}
