//! Authentication service implementation
//!
//! Admin rights come from the configured `bot.admin_ids` list.

use std::collections::HashSet;
use tracing::warn;
use crate::utils::errors::{PageDropError, Result};

#[derive(Debug, Clone)]
pub struct AuthService {
    admin_ids: HashSet<i64>,
}

impl AuthService {
    pub fn new(admin_ids: &[i64]) -> Self {
        Self {
            admin_ids: admin_ids.iter().copied().collect(),
        }
    }

    /// Check if user is a bot admin
    pub fn is_admin(&self, user_id: i64) -> bool {
        self.admin_ids.contains(&user_id)
    }

    /// Fail with `PermissionDenied` unless the user is an admin
    pub fn require_admin(&self, user_id: i64, action: &str) -> Result<()> {
        if self.is_admin(user_id) {
            return Ok(());
        }
        warn!(user_id = user_id, action = action, "Non-admin attempted an admin action");
        Err(PageDropError::PermissionDenied(format!("{} requires admin rights", action)))
    }
}
