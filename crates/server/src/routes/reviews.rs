use axum::{
    extract::{rejection::{JsonRejection, QueryRejection}, Path, Query, State},
    Json,
};
use chrono::NaiveDate;
use common::types::Message;
use models::{CategoryStat, DailyProgress, LeaderboardEntry, ReviewRecord, ReviewSubmission};
use serde::Deserialize;

use crate::errors::JsonApiError;
use crate::state::ServerState;

/// Store one review
pub async fn submit_review(
    State(state): State<ServerState>,
    payload: Result<Json<ReviewSubmission>, JsonRejection>,
) -> Result<Json<Message>, JsonApiError> {
    let Json(submission) = payload?;
    state.reviews.submit_review(submission).await?;
    Ok(Json(Message::new("Review saved successfully")))
}

/// All reviews, in submission order
pub async fn list_reviews(State(state): State<ServerState>) -> Result<Json<Vec<ReviewRecord>>, JsonApiError> {
    Ok(Json(state.reviews.list_reviews().await?))
}

pub async fn category_stats(State(state): State<ServerState>) -> Result<Json<Vec<CategoryStat>>, JsonApiError> {
    Ok(Json(state.reviews.category_stats().await?))
}

pub async fn leaderboard(State(state): State<ServerState>) -> Result<Json<Vec<LeaderboardEntry>>, JsonApiError> {
    Ok(Json(state.reviews.leaderboard().await?))
}

#[derive(Debug, Deserialize)]
pub struct ProgressQuery {
    pub date: Option<String>,
}

/// Reviews a user submitted on `?date=YYYY-MM-DD` (default: today, UTC)
pub async fn user_progress(
    State(state): State<ServerState>,
    Path(user): Path<String>,
    query: Result<Query<ProgressQuery>, QueryRejection>,
) -> Result<Json<DailyProgress>, JsonApiError> {
    let Query(q) = query?;
    let date = match q.date.as_deref().map(str::trim).filter(|d| !d.is_empty()) {
        Some(raw) => Some(
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .map_err(|_| JsonApiError::bad_request(format!("date must be YYYY-MM-DD, got `{raw}`")))?,
        ),
        None => None,
    };
    Ok(Json(state.reviews.user_daily_progress(&user, date).await?))
}
