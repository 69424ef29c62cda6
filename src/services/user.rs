//! User service implementation
//!
//! This service handles account registration on first contact and the
//! account listings shown to admins.

use std::sync::Arc;
use chrono::Utc;
use tracing::{debug, info};
use crate::database::UserStore;
use crate::models::{NewUserAccount, UserAccount};
use crate::services::quota::QuotaDefaults;
use crate::utils::errors::{PageDropError, Result};

/// User service for managing accounts
#[derive(Debug, Clone)]
pub struct UserService {
    users: Arc<dyn UserStore>,
    defaults: QuotaDefaults,
}

impl UserService {
    /// Create a new UserService instance
    pub fn new(users: Arc<dyn UserStore>, defaults: QuotaDefaults) -> Self {
        Self { users, defaults }
    }

    /// Register a new account or get the existing one
    ///
    /// The flag is `true` only for the call that created the account.
    pub async fn register_or_get_user(&self, chat_id: i64, name: Option<String>) -> Result<(UserAccount, bool)> {
        debug!(user_id = chat_id, "Attempting to register or get user");

        if let Some(existing) = self.users.get_user(chat_id).await? {
            return Ok((existing, false));
        }

        let defaults = self.defaults.current();
        let account = NewUserAccount {
            chat_id,
            name,
            base_limit: defaults.default_base_limit,
            referral_reward: defaults.default_referral_reward,
        }
        .into_account(Utc::now());

        if self.users.create_if_absent(account.clone()).await? {
            info!(user_id = chat_id, base_limit = account.stats.base_limit, "New user registered");
            return Ok((account, true));
        }

        // Lost a race with a concurrent first contact
        let existing = self
            .users
            .get_user(chat_id)
            .await?
            .ok_or(PageDropError::UserNotFound { user_id: chat_id })?;
        Ok((existing, false))
    }

    pub async fn get_user(&self, chat_id: i64) -> Result<Option<UserAccount>> {
        self.users.get_user(chat_id).await
    }

    /// All accounts, oldest first
    pub async fn list_users(&self) -> Result<Vec<UserAccount>> {
        self.users.list_users().await
    }

    pub async fn count_users(&self) -> Result<u64> {
        self.users.count_users().await
    }
}
