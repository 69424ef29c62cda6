//! Referral processor
//!
//! Credits a referrer once per referred identity when a new account is
//! created from a `/start <referrerId>` link.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::{info, warn};
use crate::database::UserStore;
use crate::models::QuotaStats;
use crate::services::notification::MessageSender;
use crate::utils::errors::{PageDropError, Result};

/// What happened to a referral attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReferralOutcome {
    /// The referrer gained credit; holds their updated stats
    Credited(QuotaStats),
    /// This identity was already credited to the referrer
    AlreadyCredited,
    SelfReferral,
    /// No account exists for the referrer
    UnknownReferrer,
}

#[derive(Debug, Clone)]
pub struct ReferralService {
    users: Arc<dyn UserStore>,
    sender: Arc<dyn MessageSender>,
}

impl ReferralService {
    pub fn new(users: Arc<dyn UserStore>, sender: Arc<dyn MessageSender>) -> Self {
        Self { users, sender }
    }

    /// Credit `referrer_id` for bringing in `new_user_id`
    ///
    /// Idempotent per pair. Self-referrals and unknown referrers are skipped
    /// silently. The referrer is notified on a best-effort basis.
    pub async fn apply_referral(&self, referrer_id: i64, new_user_id: i64) -> Result<ReferralOutcome> {
        if referrer_id == new_user_id {
            info!(user_id = new_user_id, "Ignoring self-referral");
            return Ok(ReferralOutcome::SelfReferral);
        }

        let credited = Arc::new(AtomicBool::new(false));
        let flag = credited.clone();
        let result = self
            .users
            .update_stats(
                referrer_id,
                Box::new(move |stats: &mut QuotaStats| {
                    flag.store(stats.add_referral(new_user_id), Ordering::SeqCst);
                    Ok(())
                }),
            )
            .await;

        let stats = match result {
            Ok(stats) => stats,
            Err(PageDropError::UserNotFound { .. }) => {
                info!(referrer_id = referrer_id, user_id = new_user_id, "Referrer has no account; skipping credit");
                return Ok(ReferralOutcome::UnknownReferrer);
            }
            Err(e) => return Err(e),
        };

        if !credited.load(Ordering::SeqCst) {
            info!(referrer_id = referrer_id, user_id = new_user_id, "Referral already credited");
            return Ok(ReferralOutcome::AlreadyCredited);
        }

        info!(
            referrer_id = referrer_id,
            user_id = new_user_id,
            referrals = stats.referral_count(),
            total_slots = stats.total_slots(),
            "Referral credited"
        );

        let notice = format!(
            "🎉 Someone joined with your referral link! You earned {} extra upload slot(s).\n\
             📦 You now have {} slots in total.",
            stats.referral_reward, stats.total_slots()
        );
        if let Err(e) = self.sender.send_text(referrer_id, &notice).await {
            warn!(referrer_id = referrer_id, error = %e, "Failed to notify referrer");
        }

        Ok(ReferralOutcome::Credited(stats))
    }
}
