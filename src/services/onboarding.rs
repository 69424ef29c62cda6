//! First contact through /start
//!
//! Order matters here: the ban check runs first, the day's visit is
//! recorded before anything can fail, and a referral payload only counts
//! for the call that created the account.

use tracing::{debug, warn};
use crate::models::UserAccount;
use crate::services::referral::ReferralOutcome;
use crate::services::ServiceFactory;
use crate::utils::errors::{PageDropError, Result};
use crate::utils::helpers::parse_referral_payload;
use crate::utils::logging::log_user_action;

/// Result of a /start
#[derive(Debug, Clone, PartialEq)]
pub struct Onboarding {
    pub account: UserAccount,
    /// `true` only when this call created the account
    pub created: bool,
    /// Set when a referral payload was processed
    pub referral: Option<ReferralOutcome>,
}

impl ServiceFactory {
    /// Admit `user_id` through /start with an optional referral `payload`
    pub async fn onboard(&self, user_id: i64, name: Option<String>, payload: &str) -> Result<Onboarding> {
        if self.moderation_service.is_banned(user_id) {
            return Err(PageDropError::Banned { user_id });
        }

        if let Err(e) = self.daily_usage_service.track(user_id).await {
            warn!(user_id = user_id, error = %e, "Failed to record daily usage");
        }

        let (account, created) = self.user_service.register_or_get_user(user_id, name).await?;
        if !created {
            return Ok(Onboarding {
                account,
                created,
                referral: None,
            });
        }

        log_user_action(user_id, "registered", None);

        // Malformed payloads are simply not referrals
        let referral = match parse_referral_payload(payload) {
            Some(referrer_id) => match self.referral_service.apply_referral(referrer_id, user_id).await {
                Ok(outcome) => {
                    debug!(user_id = user_id, referrer_id = referrer_id, outcome = ?outcome, "Referral processed");
                    Some(outcome)
                }
                Err(e) => {
                    warn!(user_id = user_id, referrer_id = referrer_id, error = %e, "Referral could not be applied");
                    None
                }
            },
            None => None,
        };

        Ok(Onboarding {
            account,
            created,
            referral,
        })
    }
}
