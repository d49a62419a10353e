use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::timestamp;

/// One persisted review.
///
/// `category` and `timestamp` are optional on the stored shape: collections
/// written before categories existed still decode, and the aggregates skip
/// records that lack them. New records always carry both (see
/// [`ReviewSubmission::validate`]).
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewRecord {
    pub user: String,
    pub question: String,
    pub answer: String,
    pub question_rating: i64,
    pub answer_rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

/// Inbound review payload. Every field except `comment` is required; serde
/// rejects missing or mistyped fields before `validate` runs.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ReviewSubmission {
    pub user: String,
    pub question: String,
    pub answer: String,
    pub question_rating: i64,
    pub answer_rating: i64,
    #[serde(default)]
    pub comment: Option<String>,
    pub timestamp: String,
    pub category: String,
}

impl ReviewSubmission {
    /// Check the semantic constraints serde cannot express and build the record to store.
    pub fn validate(self) -> Result<ReviewRecord, ModelError> {
        if self.user.trim().is_empty() {
            return Err(ModelError::Validation("user must not be empty".into()));
        }
        if self.category.trim().is_empty() {
            return Err(ModelError::Validation("category must not be empty".into()));
        }
        if timestamp::parse_utc(&self.timestamp).is_none() {
            return Err(ModelError::Validation(format!(
                "timestamp is not ISO-8601: {}",
                self.timestamp
            )));
        }
        Ok(ReviewRecord {
            user: self.user,
            question: self.question,
            answer: self.answer,
            question_rating: self.question_rating,
            answer_rating: self.answer_rating,
            comment: self.comment,
            timestamp: Some(self.timestamp),
            category: Some(self.category),
        })
    }
}
