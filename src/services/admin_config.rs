//! Admin configuration mutator
//!
//! Bulk edits of the quota settings across every account. Each account is
//! updated on its own; a failure on one account is logged and collected and
//! the scan carries on with the next.

use std::sync::Arc;
use tracing::{info, warn};
use crate::database::UserStore;
use crate::models::QuotaStats;
use crate::services::quota::QuotaDefaults;
use crate::utils::errors::{PageDropError, Result};

/// Outcome of one bulk edit
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BulkUpdateReport {
    pub updated: usize,
    /// Accounts whose update failed
    pub failed: Vec<i64>,
}

impl BulkUpdateReport {
    pub fn is_complete(&self) -> bool {
        self.failed.is_empty()
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfigService {
    users: Arc<dyn UserStore>,
    defaults: QuotaDefaults,
}

impl AdminConfigService {
    pub fn new(users: Arc<dyn UserStore>, defaults: QuotaDefaults) -> Self {
        Self { users, defaults }
    }

    /// Overwrite every account's base limit
    ///
    /// This may leave accounts above their new total; they simply cannot
    /// upload until they are back under it.
    pub async fn set_default_base_limit(&self, new_limit: u32) -> Result<BulkUpdateReport> {
        ensure_positive(new_limit, "Slot limit")?;
        self.defaults.set_base_limit(new_limit);

        let report = self
            .apply_to_all("set_default_base_limit", move |stats| stats.base_limit = new_limit)
            .await?;
        info!(base_limit = new_limit, updated = report.updated, failed = report.failed.len(), "Default base limit applied");
        Ok(report)
    }

    /// Set the slots granted per referral on every account
    pub async fn set_referral_reward(&self, new_reward: u32) -> Result<BulkUpdateReport> {
        ensure_positive(new_reward, "Referral reward")?;
        self.defaults.set_referral_reward(new_reward);

        let report = self
            .apply_to_all("set_referral_reward", move |stats| stats.referral_reward = new_reward)
            .await?;
        info!(referral_reward = new_reward, updated = report.updated, failed = report.failed.len(), "Referral reward applied");
        Ok(report)
    }

    async fn apply_to_all<F>(&self, operation: &str, edit: F) -> Result<BulkUpdateReport>
    where
        F: Fn(&mut QuotaStats) + Clone + Send + 'static,
    {
        let accounts = self.users.list_users().await?;
        let mut report = BulkUpdateReport::default();

        for account in accounts {
            let edit = edit.clone();
            let result = self
                .users
                .update_stats(
                    account.chat_id,
                    Box::new(move |stats: &mut QuotaStats| {
                        edit(stats);
                        Ok(())
                    }),
                )
                .await;

            match result {
                Ok(_) => report.updated += 1,
                Err(e) => {
                    warn!(operation = operation, user_id = account.chat_id, error = %e, "Bulk update failed for account");
                    report.failed.push(account.chat_id);
                }
            }
        }

        Ok(report)
    }
}

fn ensure_positive(value: u32, what: &str) -> Result<()> {
    if value == 0 {
        return Err(PageDropError::InvalidInput(format!("{} must be a positive whole number.", what)));
    }
    Ok(())
}
