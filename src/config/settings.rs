//! Application settings management
//!
//! This module defines the configuration structure and provides methods
//! for loading settings from TOML files and environment variables.

use serde::{Deserialize, Serialize};

/// Main application configuration structure
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    pub bot: BotConfig,
    pub database: DatabaseConfig,
    pub redis: RedisConfig,
    pub storage: StorageConfig,
    pub quota: QuotaConfig,
    pub session: SessionConfig,
    pub broadcast: BroadcastConfig,
    pub logging: LoggingConfig,
}

/// Telegram bot configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BotConfig {
    pub token: String,
    pub admin_ids: Vec<i64>,
    /// Bot username used in referral links; resolved with `getMe` when absent
    pub username: Option<String>,
    pub contact_url: Option<String>,
}

/// Which document store backs user records and daily stats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    Postgres,
    Memory,
}

/// Database configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    pub backend: StoreBackend,
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
}

/// Redis configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RedisConfig {
    pub url: String,
    pub prefix: String,
}

/// Object storage backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Firebase,
    Memory,
}

/// Object storage configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    pub bucket: String,
    /// Path to a service account JSON file
    pub credentials_path: Option<String>,
    /// Inline service account JSON (takes precedence over the path)
    pub credentials_json: Option<String>,
    /// Static bearer token, for the storage emulator
    pub emulator_token: Option<String>,
    pub api_url: String,
    pub download_url: String,
    pub timeout_seconds: u64,
}

/// Slot quota defaults applied to new accounts
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct QuotaConfig {
    pub default_base_limit: u32,
    pub default_referral_reward: u32,
}

/// Where pending conversation input is kept
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    Memory,
    Redis,
}

/// Conversation session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    pub backend: SessionBackend,
    pub timeout_seconds: u64,
}

/// Broadcast fan-out configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BroadcastConfig {
    pub messages_per_second: u32,
    pub concurrency: usize,
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    pub level: String,
    pub file_path: Option<String>,
}

impl Settings {
    /// Load settings from configuration file and environment variables
    pub fn new() -> Result<Self, config::ConfigError> {
        let settings = config::Config::builder()
            .add_source(config::Config::try_from(&Settings::default())?)
            .add_source(config::File::with_name("config").required(false))
            .add_source(
                config::Environment::with_prefix("PAGEDROP")
                    .separator("__")
                    .list_separator(",")
                    .with_list_parse_key("bot.admin_ids")
                    .try_parsing(true),
            )
            .build()?;

        settings.try_deserialize()
    }

    /// Validate configuration settings
    pub fn validate(&self) -> Result<(), crate::utils::errors::PageDropError> {
        super::validation::validate_settings(self)
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bot: BotConfig {
                token: String::new(),
                admin_ids: vec![],
                username: None,
                contact_url: None,
            },
            database: DatabaseConfig {
                backend: StoreBackend::Postgres,
                url: "postgresql://localhost/pagedrop".to_string(),
                max_connections: 10,
                min_connections: 1,
            },
            redis: RedisConfig {
                url: "redis://localhost:6379".to_string(),
                prefix: "pagedrop:".to_string(),
            },
            storage: StorageConfig {
                backend: StorageBackend::Firebase,
                bucket: String::new(),
                credentials_path: None,
                credentials_json: None,
                emulator_token: None,
                api_url: "https://storage.googleapis.com".to_string(),
                download_url: "https://firebasestorage.googleapis.com".to_string(),
                timeout_seconds: 60,
            },
            quota: QuotaConfig {
                default_base_limit: 2,
                default_referral_reward: 1,
            },
            session: SessionConfig {
                backend: SessionBackend::Memory,
                timeout_seconds: 300,
            },
            broadcast: BroadcastConfig {
                messages_per_second: 25,
                concurrency: 4,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file_path: None,
            },
        }
    }
}
