//! Read-side aggregates over a snapshot of review records. Pure functions.

use std::collections::HashMap;

use chrono::NaiveDate;
use models::{timestamp, CategoryStat, LeaderboardEntry, ReviewRecord};

/// Count records per category, highest count first.
///
/// Records without a category are left out. Equal counts keep the order in
/// which their category was first seen.
pub fn category_stats(records: &[ReviewRecord]) -> Vec<CategoryStat> {
    let categories = records
        .iter()
        .filter_map(|r| r.category.as_deref())
        .filter(|c| !c.is_empty());
    count_by_first_seen(categories)
        .into_iter()
        .map(|(category, count)| CategoryStat { category, count })
        .collect()
}

/// Number of records by `user` (exact, case-sensitive) whose timestamp falls
/// on `date` in UTC. Missing or unparseable timestamps are skipped.
pub fn daily_progress(records: &[ReviewRecord], user: &str, date: NaiveDate) -> u64 {
    records
        .iter()
        .filter(|r| r.user == user)
        .filter_map(|r| r.timestamp.as_deref())
        .filter_map(timestamp::utc_date)
        .filter(|d| *d == date)
        .count() as u64
}

/// Reviews per user, most active first. Records with an empty user are left out.
pub fn leaderboard(records: &[ReviewRecord]) -> Vec<LeaderboardEntry> {
    let users = records.iter().map(|r| r.user.as_str()).filter(|u| !u.is_empty());
    count_by_first_seen(users)
        .into_iter()
        .map(|(user, count)| LeaderboardEntry { user, count })
        .collect()
}

fn count_by_first_seen<'a>(keys: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut index: HashMap<&'a str, usize> = HashMap::new();
    let mut counts: Vec<(String, u64)> = Vec::new();
    for key in keys {
        match index.get(key) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(key, counts.len());
                counts.push((key.to_string(), 1));
            }
        }
    }
    // stable: ties stay in first-seen order
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}
