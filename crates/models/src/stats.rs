use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Number of reviews recorded for one category.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CategoryStat {
    pub category: String,
    pub count: u64,
}

/// Reviews a user submitted on one UTC calendar day.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct DailyProgress {
    pub user: String,
    pub date: NaiveDate,
    pub daily_count: u64,
}

/// Total reviews per user, used by the leaderboard view.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct LeaderboardEntry {
    pub user: String,
    pub count: u64,
}
