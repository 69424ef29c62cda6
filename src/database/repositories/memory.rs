//! In-process stores
//!
//! Used by tests and by the `memory` backend. Each store guards its map with
//! one mutex, so every update is a serialized read-modify-write.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};
use async_trait::async_trait;
use chrono::NaiveDate;
use crate::database::store::{DailyStatsStore, StatsMutation, UserStore};
use crate::models::{DailyStatsRecord, QuotaStats, UserAccount, VisitOutcome};
use crate::utils::errors::{PageDropError, Result};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone, Default)]
pub struct MemoryUserStore {
    users: Arc<Mutex<HashMap<i64, UserAccount>>>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn get_user(&self, chat_id: i64) -> Result<Option<UserAccount>> {
        Ok(lock(&self.users).get(&chat_id).cloned())
    }

    async fn create_if_absent(&self, account: UserAccount) -> Result<bool> {
        let mut users = lock(&self.users);
        if users.contains_key(&account.chat_id) {
            return Ok(false);
        }
        users.insert(account.chat_id, account);
        Ok(true)
    }

    async fn list_users(&self) -> Result<Vec<UserAccount>> {
        let mut users: Vec<UserAccount> = lock(&self.users).values().cloned().collect();
        users.sort_by_key(|user| (user.joined_at, user.chat_id));
        Ok(users)
    }

    async fn count_users(&self) -> Result<u64> {
        Ok(lock(&self.users).len() as u64)
    }

    async fn update_stats(&self, chat_id: i64, mutation: StatsMutation) -> Result<QuotaStats> {
        let mut users = lock(&self.users);
        let account = users
            .get_mut(&chat_id)
            .ok_or(PageDropError::UserNotFound { user_id: chat_id })?;

        // Mutate a copy so an aborted mutation leaves the record untouched
        let mut stats = account.stats.clone();
        mutation(&mut stats)?;
        account.stats = stats.clone();

        Ok(stats)
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryDailyStatsStore {
    days: Arc<Mutex<HashMap<NaiveDate, DailyStatsRecord>>>,
}

impl MemoryDailyStatsStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DailyStatsStore for MemoryDailyStatsStore {
    async fn record_visit(&self, day: NaiveDate, user_id: i64) -> Result<VisitOutcome> {
        let mut days = lock(&self.days);
        let record = days.entry(day).or_insert_with(|| DailyStatsRecord::new(day));
        Ok(record.record_visit(user_id))
    }

    async fn get_day(&self, day: NaiveDate) -> Result<Option<DailyStatsRecord>> {
        Ok(lock(&self.days).get(&day).cloned())
    }
}
