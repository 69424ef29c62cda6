//! Test context for unified test setup
//!
//! Builds a full `ServiceFactory` over the in-memory store and object
//! storage with a recording sender, so service flows can be driven end to
//! end without Telegram, Postgres or Firebase.

use std::sync::Arc;
use fake::faker::name::en::FirstName;
use fake::Fake;
use PageDrop::config::{Settings, StorageBackend, StoreBackend};
use PageDrop::database::{DatabaseService, UserStore};
use PageDrop::models::UserAccount;
use PageDrop::storage::{MemoryStorage, ObjectStorage};
use PageDrop::ServiceFactory;

use super::fakes::FakeSender;

pub const TEST_ADMIN_ID: i64 = 900_001;
pub const TEST_BOT_USERNAME: &str = "pagedrop_test_bot";

/// Knobs for [`TestContext::with_config`]
#[derive(Debug, Clone)]
pub struct TestConfig {
    pub base_limit: u32,
    pub referral_reward: u32,
    pub messages_per_second: u32,
    pub concurrency: usize,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            base_limit: 2,
            referral_reward: 1,
            messages_per_second: 1000,
            concurrency: 8,
        }
    }
}

pub struct TestContext {
    pub settings: Settings,
    pub database: DatabaseService,
    pub storage: MemoryStorage,
    pub sender: FakeSender,
    pub services: ServiceFactory,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_config(TestConfig::default())
    }

    pub fn with_config(config: TestConfig) -> Self {
        Self::build(config, DatabaseService::in_memory(), None)
    }

    /// Context over a caller-supplied user store (e.g. one injecting faults)
    pub fn with_user_store(users: Arc<dyn UserStore>) -> Self {
        let database = DatabaseService::in_memory();
        Self::build(
            TestConfig::default(),
            DatabaseService::new(users, database.daily_stats),
            None,
        )
    }

    /// Context whose file service writes to `storage` instead of memory
    pub fn with_storage(storage: Arc<dyn ObjectStorage>) -> Self {
        Self::build(TestConfig::default(), DatabaseService::in_memory(), Some(storage))
    }

    fn build(config: TestConfig, database: DatabaseService, storage_override: Option<Arc<dyn ObjectStorage>>) -> Self {
        let _ = tracing_subscriber::fmt::try_init();

        let settings = Self::create_test_settings(&config);
        let storage = MemoryStorage::new("http://files.test");
        let sender = FakeSender::new();
        let object_storage: Arc<dyn ObjectStorage> =
            storage_override.unwrap_or_else(|| Arc::new(storage.clone()) as Arc<dyn ObjectStorage>);

        let services = ServiceFactory::new(
            &settings,
            database.clone(),
            object_storage,
            Arc::new(sender.clone()),
            TEST_BOT_USERNAME.to_string(),
        );

        Self {
            settings,
            database,
            storage,
            sender,
            services,
        }
    }

    fn create_test_settings(config: &TestConfig) -> Settings {
        let mut settings = Settings::default();
        settings.bot.token = "12345:test_token".to_string();
        settings.bot.admin_ids = vec![TEST_ADMIN_ID];
        settings.database.backend = StoreBackend::Memory;
        settings.storage.backend = StorageBackend::Memory;
        settings.quota.default_base_limit = config.base_limit;
        settings.quota.default_referral_reward = config.referral_reward;
        settings.broadcast.messages_per_second = config.messages_per_second;
        settings.broadcast.concurrency = config.concurrency;
        settings
    }

    /// Register an account with a generated display name
    pub async fn register(&self, chat_id: i64) -> UserAccount {
        let name: String = FirstName().fake();
        let (account, _) = self
            .services
            .user_service
            .register_or_get_user(chat_id, Some(name))
            .await
            .expect("registration succeeds");
        account
    }

    /// Upload `name` for `user_id` with fixed HTML content
    pub async fn upload(&self, user_id: i64, name: &str) -> PageDrop::Result<PageDrop::services::UploadReceipt> {
        self.services
            .file_service
            .upload(user_id, name, Some("text/html"), async { Ok(b"<html></html>".to_vec()) })
            .await
    }
}
