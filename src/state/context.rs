//! Conversation context management
//!
//! A user with no stored context is idle. Otherwise exactly one
//! [`PendingInput`] says what their next plain message is taken as.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// What the bot expects from an issuer's next message
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PendingInput {
    AwaitingBanTarget,
    AwaitingUnbanTarget,
    AwaitingSlotEdit,
    AwaitingRewardEdit,
    AwaitingBroadcastPayload,
    AwaitingDeleteFilename,
}

impl PendingInput {
    pub fn name(&self) -> &'static str {
        match self {
            PendingInput::AwaitingBanTarget => "awaiting_ban_target",
            PendingInput::AwaitingUnbanTarget => "awaiting_unban_target",
            PendingInput::AwaitingSlotEdit => "awaiting_slot_edit",
            PendingInput::AwaitingRewardEdit => "awaiting_reward_edit",
            PendingInput::AwaitingBroadcastPayload => "awaiting_broadcast_payload",
            PendingInput::AwaitingDeleteFilename => "awaiting_delete_filename",
        }
    }

    /// Only file deletion is open to regular users
    pub fn requires_admin(&self) -> bool {
        !matches!(self, PendingInput::AwaitingDeleteFilename)
    }
}

impl std::fmt::Display for PendingInput {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// One issuer's armed expectation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationContext {
    pub user_id: i64,
    pub pending: PendingInput,
    pub started_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

impl ConversationContext {
    pub fn new(user_id: i64, pending: PendingInput, timeout: Duration) -> Self {
        let now = Utc::now();
        Self {
            user_id,
            pending,
            started_at: now,
            expires_at: now + timeout,
        }
    }

    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Seconds left before the context lapses back to idle
    pub fn remaining_seconds(&self) -> u64 {
        u64::try_from((self.expires_at - Utc::now()).num_seconds()).unwrap_or(0)
    }
}
