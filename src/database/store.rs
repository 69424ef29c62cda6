//! Document store seams
//!
//! Handlers and services only see these traits; Postgres and in-memory
//! repositories implement them with the same atomicity guarantees.

use async_trait::async_trait;
use chrono::NaiveDate;
use crate::models::{DailyStatsRecord, QuotaStats, UserAccount, VisitOutcome};
use crate::utils::errors::Result;

/// Read-modify-write applied to one account's stats under the store's lock
///
/// Returning an error aborts the update and nothing is written.
pub type StatsMutation = Box<dyn FnOnce(&mut QuotaStats) -> Result<()> + Send>;

#[async_trait]
pub trait UserStore: Send + Sync + std::fmt::Debug {
    /// Load an account, if it exists
    async fn get_user(&self, chat_id: i64) -> Result<Option<UserAccount>>;

    /// Insert the account unless one already exists; `true` when created
    async fn create_if_absent(&self, account: UserAccount) -> Result<bool>;

    /// Every known account, oldest first
    async fn list_users(&self) -> Result<Vec<UserAccount>>;

    async fn count_users(&self) -> Result<u64>;

    /// Atomically update one account's stats and return the stored result
    ///
    /// Fails with `UserNotFound` if the account does not exist. Concurrent
    /// calls for the same account are serialized.
    async fn update_stats(&self, chat_id: i64, mutation: StatsMutation) -> Result<QuotaStats>;
}

#[async_trait]
pub trait DailyStatsStore: Send + Sync + std::fmt::Debug {
    /// Add `user_id` to the day's record in one atomic step
    async fn record_visit(&self, day: NaiveDate, user_id: i64) -> Result<VisitOutcome>;

    async fn get_day(&self, day: NaiveDate) -> Result<Option<DailyStatsRecord>>;
}
