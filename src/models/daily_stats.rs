//! Daily distinct-user statistics

use std::collections::BTreeSet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Distinct identities seen on one UTC calendar day
///
/// `count` always equals `users.len()`; only `record_visit` mutates either.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "StoredDailyStats")]
pub struct DailyStatsRecord {
    pub day: NaiveDate,
    users: BTreeSet<i64>,
    count: u32,
}

/// Stored shape; any persisted `count` is recomputed from `users`
#[derive(Deserialize)]
struct StoredDailyStats {
    day: NaiveDate,
    #[serde(default)]
    users: BTreeSet<i64>,
}

impl From<StoredDailyStats> for DailyStatsRecord {
    fn from(stored: StoredDailyStats) -> Self {
        Self::from_users(stored.day, stored.users)
    }
}

/// Result of recording a visit
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VisitOutcome {
    /// First sighting of the day created the record
    Created,
    /// The identity was appended to an existing record
    Added,
    AlreadySeen,
}

impl DailyStatsRecord {
    pub fn new(day: NaiveDate) -> Self {
        Self {
            day,
            users: BTreeSet::new(),
            count: 0,
        }
    }

    pub fn from_users(day: NaiveDate, users: impl IntoIterator<Item = i64>) -> Self {
        let users: BTreeSet<i64> = users.into_iter().collect();
        let count = u32::try_from(users.len()).unwrap_or(u32::MAX);
        Self { day, users, count }
    }

    pub fn record_visit(&mut self, user_id: i64) -> VisitOutcome {
        let was_empty = self.users.is_empty();
        if !self.users.insert(user_id) {
            return VisitOutcome::AlreadySeen;
        }
        self.count = u32::try_from(self.users.len()).unwrap_or(u32::MAX);
        if was_empty {
            VisitOutcome::Created
        } else {
            VisitOutcome::Added
        }
    }

    pub fn count(&self) -> u32 {
        self.count
    }

    pub fn users(&self) -> &BTreeSet<i64> {
        &self.users
    }

    pub fn contains(&self, user_id: i64) -> bool {
        self.users.contains(&user_id)
    }
}
