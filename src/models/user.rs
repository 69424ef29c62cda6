//! User account model and the slot quota arithmetic

use std::collections::BTreeSet;
use serde::{Deserialize, Serialize};
use chrono::{DateTime, Utc};

/// Display name used when Telegram gives us none
pub const UNKNOWN_NAME: &str = "Unknown";

/// One record per chat identity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccount {
    pub chat_id: i64,
    pub name: String,
    pub joined_at: DateTime<Utc>,
    pub stats: QuotaStats,
}

/// Data needed to create an account on first contact
#[derive(Debug, Clone)]
pub struct NewUserAccount {
    pub chat_id: i64,
    pub name: Option<String>,
    pub base_limit: u32,
    pub referral_reward: u32,
}

impl NewUserAccount {
    pub fn into_account(self, joined_at: DateTime<Utc>) -> UserAccount {
        UserAccount {
            chat_id: self.chat_id,
            name: self
                .name
                .filter(|name| !name.trim().is_empty())
                .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
            joined_at,
            stats: QuotaStats::new(self.base_limit, self.referral_reward),
        }
    }
}

fn default_referral_reward() -> u32 {
    1
}

/// Upload quota embedded in every account
///
/// `referrals` is a set: an identity credits its referrer at most once.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuotaStats {
    #[serde(default)]
    pub file_count: u32,
    pub base_limit: u32,
    #[serde(default)]
    pub referrals: BTreeSet<i64>,
    #[serde(default = "default_referral_reward")]
    pub referral_reward: u32,
}

impl Default for QuotaStats {
    fn default() -> Self {
        Self::new(2, default_referral_reward())
    }
}

impl QuotaStats {
    pub fn new(base_limit: u32, referral_reward: u32) -> Self {
        Self {
            file_count: 0,
            base_limit,
            referrals: BTreeSet::new(),
            referral_reward: referral_reward.max(1),
        }
    }

    pub fn referral_count(&self) -> u32 {
        u32::try_from(self.referrals.len()).unwrap_or(u32::MAX)
    }

    /// Slots earned through referrals
    pub fn referral_slots(&self) -> u32 {
        self.referral_count().saturating_mul(self.referral_reward.max(1))
    }

    /// Total allowance: base limit plus referral credit
    pub fn total_slots(&self) -> u32 {
        self.base_limit.saturating_add(self.referral_slots())
    }

    pub fn remaining_slots(&self) -> u32 {
        self.total_slots().saturating_sub(self.file_count)
    }

    /// Admission is decided before the increment
    pub fn can_admit_upload(&self) -> bool {
        self.file_count < self.total_slots()
    }

    /// Apply a signed change to `file_count`, flooring at zero
    ///
    /// Returns `false` when the floor was hit.
    pub fn apply_delta(&mut self, delta: i32) -> bool {
        let updated = i64::from(self.file_count) + i64::from(delta);
        if updated < 0 {
            self.file_count = 0;
            return false;
        }
        self.file_count = u32::try_from(updated).unwrap_or(u32::MAX);
        true
    }

    /// Credit a referred identity; `false` if it was already credited
    pub fn add_referral(&mut self, referred_id: i64) -> bool {
        self.referrals.insert(referred_id)
    }

    pub fn has_referral(&self, referred_id: i64) -> bool {
        self.referrals.contains(&referred_id)
    }
}
