//! Services module
//!
//! This module contains business logic services

pub mod admin_config;
pub mod auth;
pub mod broadcast;
pub mod daily_usage;
pub mod files;
pub mod moderation;
pub mod notification;
pub mod onboarding;
pub mod quota;
pub mod referral;
pub mod user;

// Re-export commonly used services
pub use admin_config::{AdminConfigService, BulkUpdateReport};
pub use auth::AuthService;
pub use broadcast::{BroadcastGate, BroadcastService};
pub use daily_usage::DailyUsageService;
pub use files::{FileService, HostedFile, PurgeReport, UploadReceipt};
pub use moderation::ModerationService;
pub use notification::{MessageSender, TelegramSender};
pub use onboarding::Onboarding;
pub use quota::{QuotaDefaults, QuotaService};
pub use referral::{ReferralOutcome, ReferralService};
pub use user::UserService;

use std::sync::Arc;
use std::time::Duration;
use crate::config::settings::Settings;
use crate::database::DatabaseService;
use crate::storage::ObjectStorage;

/// Service factory for creating and managing all services
#[derive(Debug, Clone)]
pub struct ServiceFactory {
    pub user_service: UserService,
    pub quota_service: QuotaService,
    pub referral_service: ReferralService,
    pub admin_config_service: AdminConfigService,
    pub broadcast_service: BroadcastService,
    pub daily_usage_service: DailyUsageService,
    pub file_service: FileService,
    pub auth_service: AuthService,
    pub moderation_service: ModerationService,
    /// Quota settings given to new accounts
    pub quota_defaults: QuotaDefaults,
    pub notifier: Arc<dyn MessageSender>,
    /// Bot username used in referral links
    pub bot_username: String,
    pub contact_url: Option<String>,
}

impl ServiceFactory {
    /// Create a new ServiceFactory with all services initialized
    pub fn new(
        settings: &Settings,
        database: DatabaseService,
        storage: Arc<dyn ObjectStorage>,
        sender: Arc<dyn MessageSender>,
        bot_username: String,
    ) -> Self {
        let defaults = QuotaDefaults::new(settings.quota.clone());
        let quota_service = QuotaService::new(database.users.clone(), defaults.clone());
        let gate = BroadcastGate::new(Duration::from_secs(settings.session.timeout_seconds));

        Self {
            user_service: UserService::new(database.users.clone(), defaults.clone()),
            referral_service: ReferralService::new(database.users.clone(), sender.clone()),
            admin_config_service: AdminConfigService::new(database.users.clone(), defaults.clone()),
            broadcast_service: BroadcastService::new(
                database.users.clone(),
                sender.clone(),
                settings.broadcast.clone(),
                gate,
            ),
            daily_usage_service: DailyUsageService::new(database.daily_stats.clone()),
            file_service: FileService::new(storage, quota_service.clone()),
            quota_service,
            auth_service: AuthService::new(&settings.bot.admin_ids),
            moderation_service: ModerationService::new(),
            quota_defaults: defaults,
            notifier: sender,
            bot_username,
            contact_url: settings.bot.contact_url.clone(),
        }
    }
}
