//! Broadcast dispatcher
//!
//! An admin arms the [`BroadcastGate`]; their next message becomes the
//! payload and is fanned out to every known account. Deliveries are rate
//! limited and run a few at a time. A failed delivery is logged and counted
//! but never stops the rest.

use std::num::NonZeroU32;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::{Duration, Instant};
use futures::future::join_all;
use governor::{Quota, RateLimiter};
use tokio::sync::Semaphore;
use tracing::{info, warn};
use crate::config::BroadcastConfig;
use crate::database::UserStore;
use crate::models::{BroadcastPayload, BroadcastReport};
use crate::services::notification::MessageSender;
use crate::utils::errors::{PageDropError, Result};

#[derive(Debug, Clone, Copy)]
struct ArmedBroadcast {
    admin_id: i64,
    armed_at: Instant,
}

/// Process-wide exclusive broadcast capture
///
/// At most one admin may be composing a broadcast at a time. A second admin
/// trying to arm it gets `BroadcastPending` until the first one sends their
/// message, cancels, or the arming expires.
#[derive(Debug, Clone)]
pub struct BroadcastGate {
    armed: Arc<Mutex<Option<ArmedBroadcast>>>,
    timeout: Duration,
}

impl BroadcastGate {
    pub fn new(timeout: Duration) -> Self {
        Self {
            armed: Arc::new(Mutex::new(None)),
            timeout,
        }
    }

    fn slot(&self) -> MutexGuard<'_, Option<ArmedBroadcast>> {
        self.armed.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn live(&self, armed: &Option<ArmedBroadcast>) -> Option<ArmedBroadcast> {
        armed.filter(|a| a.armed_at.elapsed() < self.timeout)
    }

    /// Arm the gate for `admin_id`; re-arming by the same admin refreshes it
    pub fn arm(&self, admin_id: i64) -> Result<()> {
        let mut slot = self.slot();
        if let Some(current) = self.live(&slot) {
            if current.admin_id != admin_id {
                warn!(admin_id = admin_id, holder = current.admin_id, "Broadcast already armed by another admin");
                return Err(PageDropError::BroadcastPending);
            }
        }
        *slot = Some(ArmedBroadcast {
            admin_id,
            armed_at: Instant::now(),
        });
        Ok(())
    }

    pub fn is_armed_by(&self, admin_id: i64) -> bool {
        matches!(self.live(&self.slot()), Some(a) if a.admin_id == admin_id)
    }

    /// Consume the arming if `admin_id` holds it; `true` when consumed
    pub fn take(&self, admin_id: i64) -> bool {
        let mut slot = self.slot();
        match self.live(&slot) {
            Some(current) if current.admin_id == admin_id => {
                *slot = None;
                true
            }
            _ => false,
        }
    }

    /// Release the gate if `admin_id` holds it (or it has expired)
    pub fn disarm(&self, admin_id: i64) {
        let mut slot = self.slot();
        match self.live(&slot) {
            Some(current) if current.admin_id != admin_id => {}
            _ => *slot = None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct BroadcastService {
    users: Arc<dyn UserStore>,
    sender: Arc<dyn MessageSender>,
    config: BroadcastConfig,
    gate: BroadcastGate,
}

impl BroadcastService {
    pub fn new(users: Arc<dyn UserStore>, sender: Arc<dyn MessageSender>, config: BroadcastConfig, gate: BroadcastGate) -> Self {
        Self { users, sender, config, gate }
    }

    pub fn gate(&self) -> &BroadcastGate {
        &self.gate
    }

    /// Deliver `payload` to every known account
    pub async fn broadcast(&self, payload: &BroadcastPayload) -> Result<BroadcastReport> {
        let recipients: Vec<i64> = self.users.list_users().await?.into_iter().map(|u| u.chat_id).collect();
        let total = recipients.len();
        info!(recipients = total, kind = payload.kind(), "Starting broadcast");

        let rate = NonZeroU32::new(self.config.messages_per_second).unwrap_or(NonZeroU32::MIN);
        let limiter = RateLimiter::direct(Quota::per_second(rate));
        let limiter = &limiter;
        let permits = Semaphore::new(self.config.concurrency.max(1));
        let permits = &permits;

        let deliveries = recipients.into_iter().map(|chat_id| async move {
            let Ok(_permit) = permits.acquire().await else {
                return (chat_id, false);
            };
            limiter.until_ready().await;
            match self.sender.send_payload(chat_id, payload).await {
                Ok(()) => (chat_id, true),
                Err(e) => {
                    warn!(chat_id = chat_id, error = %e, "Broadcast delivery failed");
                    (chat_id, false)
                }
            }
        });
        let outcomes: Vec<(i64, bool)> = join_all(deliveries).await;

        let mut report = BroadcastReport {
            total,
            ..BroadcastReport::default()
        };
        for (chat_id, delivered) in outcomes {
            if delivered {
                report.delivered += 1;
            } else {
                report.failed.push(chat_id);
            }
        }
        report.failed.sort_unstable();

        info!(total = report.total, delivered = report.delivered, failed = report.failed.len(), "Broadcast finished");
        Ok(report)
    }
}
