//! Quota engine
//!
//! Slot accounting over a user's [`QuotaStats`]. Every change goes through
//! the store's atomic per-account update, so admission and increment happen
//! in one step and concurrent uploads cannot over-admit.

use std::sync::{Arc, RwLock};
use tracing::{debug, warn};
use crate::config::QuotaConfig;
use crate::database::UserStore;
use crate::models::QuotaStats;
use crate::utils::errors::{PageDropError, Result};
use crate::utils::logging::log_quota_decision;

/// Quota defaults handed to new accounts, adjustable at runtime by admins
#[derive(Debug, Clone)]
pub struct QuotaDefaults {
    inner: Arc<RwLock<QuotaConfig>>,
}

impl QuotaDefaults {
    pub fn new(config: QuotaConfig) -> Self {
        Self {
            inner: Arc::new(RwLock::new(config)),
        }
    }

    pub fn current(&self) -> QuotaConfig {
        self.inner.read().unwrap_or_else(|poisoned| poisoned.into_inner()).clone()
    }

    pub fn set_base_limit(&self, base_limit: u32) {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner()).default_base_limit = base_limit;
    }

    pub fn set_referral_reward(&self, reward: u32) {
        self.inner.write().unwrap_or_else(|poisoned| poisoned.into_inner()).default_referral_reward = reward;
    }

    /// Stats a brand new account starts with
    pub fn fresh_stats(&self) -> QuotaStats {
        let config = self.current();
        QuotaStats::new(config.default_base_limit, config.default_referral_reward)
    }
}

#[derive(Debug, Clone)]
pub struct QuotaService {
    users: Arc<dyn UserStore>,
    defaults: QuotaDefaults,
}

impl QuotaService {
    pub fn new(users: Arc<dyn UserStore>, defaults: QuotaDefaults) -> Self {
        Self { users, defaults }
    }

    /// Stats of an existing account, or fresh defaults when there is none
    ///
    /// Never creates an account.
    pub async fn get_stats(&self, user_id: i64) -> Result<QuotaStats> {
        match self.users.get_user(user_id).await? {
            Some(account) => Ok(account.stats),
            None => {
                debug!(user_id = user_id, "No account yet; reporting default stats");
                Ok(self.defaults.fresh_stats())
            }
        }
    }

    pub async fn can_admit_upload(&self, user_id: i64) -> Result<bool> {
        Ok(self.get_stats(user_id).await?.can_admit_upload())
    }

    /// Take one slot if the account has one free, in a single atomic update
    ///
    /// Fails with `QuotaExceeded` (and writes nothing) when all slots are used.
    pub async fn reserve_slot(&self, user_id: i64) -> Result<QuotaStats> {
        let result = self
            .users
            .update_stats(
                user_id,
                Box::new(|stats: &mut QuotaStats| {
                    if !stats.can_admit_upload() {
                        return Err(PageDropError::QuotaExceeded {
                            used: stats.file_count,
                            total: stats.total_slots(),
                        });
                    }
                    stats.apply_delta(1);
                    Ok(())
                }),
            )
            .await;

        match &result {
            Ok(stats) => log_quota_decision(user_id, true, stats.file_count, stats.total_slots()),
            Err(PageDropError::QuotaExceeded { used, total }) => log_quota_decision(user_id, false, *used, *total),
            Err(_) => {}
        }
        result
    }

    /// Apply a signed change to the account's file count
    ///
    /// The count floors at zero; hitting the floor is logged.
    pub async fn apply_delta(&self, user_id: i64, delta: i32) -> Result<QuotaStats> {
        self.users
            .update_stats(
                user_id,
                Box::new(move |stats: &mut QuotaStats| {
                    if !stats.apply_delta(delta) {
                        warn!(user_id = user_id, delta = delta, "File count would go negative; clamped to zero");
                    }
                    Ok(())
                }),
            )
            .await
    }

    /// Overwrite the account's file count with what is actually stored
    pub async fn set_file_count(&self, user_id: i64, file_count: u32) -> Result<QuotaStats> {
        self.users
            .update_stats(
                user_id,
                Box::new(move |stats: &mut QuotaStats| {
                    stats.file_count = file_count;
                    Ok(())
                }),
            )
            .await
    }

    /// Give back one slot
    pub async fn release_slot(&self, user_id: i64) -> Result<QuotaStats> {
        self.apply_delta(user_id, -1).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::Utc;
    use crate::database::MemoryUserStore;
    use crate::models::NewUserAccount;

    async fn service_with_user(user_id: i64, base_limit: u32) -> QuotaService {
        let store = Arc::new(MemoryUserStore::new());
        let account = NewUserAccount {
            chat_id: user_id,
            name: Some("Alice".to_string()),
            base_limit,
            referral_reward: 1,
        }
        .into_account(Utc::now());
        store.create_if_absent(account).await.unwrap();

        let defaults = QuotaDefaults::new(QuotaConfig {
            default_base_limit: 2,
            default_referral_reward: 1,
        });
        QuotaService::new(store, defaults)
    }

    #[tokio::test]
    async fn test_get_stats_defaults_without_account() {
        let service = service_with_user(1, 2).await;
        let stats = service.get_stats(999).await.unwrap();
        assert_eq!(stats, QuotaStats::new(2, 1));
        assert!(service.users.get_user(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_reserve_until_exhausted() {
        let service = service_with_user(1, 2).await;
        assert_eq!(service.reserve_slot(1).await.unwrap().file_count, 1);
        assert_eq!(service.reserve_slot(1).await.unwrap().file_count, 2);
        assert_matches!(
            service.reserve_slot(1).await,
            Err(PageDropError::QuotaExceeded { used: 2, total: 2 })
        );
        assert_eq!(service.get_stats(1).await.unwrap().file_count, 2);
    }

    #[tokio::test]
    async fn test_release_floors_at_zero() {
        let service = service_with_user(1, 2).await;
        let stats = service.release_slot(1).await.unwrap();
        assert_eq!(stats.file_count, 0);
    }

    #[tokio::test]
    async fn test_reserve_requires_account() {
        let service = service_with_user(1, 2).await;
        assert_matches!(service.reserve_slot(2).await, Err(PageDropError::UserNotFound { user_id: 2 }));
    }
}
