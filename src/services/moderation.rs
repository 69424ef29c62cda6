//! Ban list
//!
//! Banned identities are held in process memory only and are forgotten on
//! restart.

use std::collections::HashSet;
use std::sync::{Arc, RwLock};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ModerationService {
    banned: Arc<RwLock<HashSet<i64>>>,
}

impl ModerationService {
    pub fn new() -> Self {
        Self::default()
    }

    /// `true` if the user was not banned before
    pub fn ban(&self, user_id: i64) -> bool {
        let added = self.banned.write().unwrap_or_else(|p| p.into_inner()).insert(user_id);
        if added {
            info!(user_id = user_id, "User banned");
        }
        added
    }

    /// `true` if the user was banned before
    pub fn unban(&self, user_id: i64) -> bool {
        let removed = self.banned.write().unwrap_or_else(|p| p.into_inner()).remove(&user_id);
        if removed {
            info!(user_id = user_id, "User unbanned");
        }
        removed
    }

    pub fn is_banned(&self, user_id: i64) -> bool {
        self.banned.read().unwrap_or_else(|p| p.into_inner()).contains(&user_id)
    }

    pub fn banned_count(&self) -> usize {
        self.banned.read().unwrap_or_else(|p| p.into_inner()).len()
    }

    /// Banned identities in ascending order
    pub fn banned_users(&self) -> Vec<i64> {
        let mut ids: Vec<i64> = self.banned.read().unwrap_or_else(|p| p.into_inner()).iter().copied().collect();
        ids.sort_unstable();
        ids
    }
}
