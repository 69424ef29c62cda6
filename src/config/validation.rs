//! Configuration validation module
//! 
//! This module provides validation functions for application configuration
//! to ensure all required settings are properly configured.

use crate::utils::errors::{PageDropError, Result};
use super::{Settings, StoreBackend, StorageBackend};

/// Validate all configuration settings
pub fn validate_settings(settings: &Settings) -> Result<()> {
    validate_bot_config(&settings.bot)?;
    validate_database_config(&settings.database)?;
    validate_storage_config(&settings.storage)?;
    validate_quota_config(&settings.quota)?;
    validate_session_config(&settings.session)?;
    validate_broadcast_config(&settings.broadcast)?;
    validate_logging_config(&settings.logging)?;

    if settings.session.backend == super::SessionBackend::Redis {
        validate_redis_config(&settings.redis)?;
    }

    Ok(())
}

/// Validate bot configuration
fn validate_bot_config(config: &super::BotConfig) -> Result<()> {
    if config.token.is_empty() {
        return Err(PageDropError::Config(
            "Bot token is required".to_string()
        ));
    }
    
    if config.admin_ids.is_empty() {
        return Err(PageDropError::Config(
            "At least one admin ID must be configured".to_string()
        ));
    }

    if let Some(contact_url) = &config.contact_url {
        url::Url::parse(contact_url)?;
    }
    
    Ok(())
}

/// Validate database configuration
fn validate_database_config(config: &super::DatabaseConfig) -> Result<()> {
    if config.backend == StoreBackend::Memory {
        return Ok(());
    }

    if config.url.is_empty() {
        return Err(PageDropError::Config(
            "Database URL is required".to_string()
        ));
    }
    
    if config.max_connections == 0 {
        return Err(PageDropError::Config(
            "Max connections must be greater than 0".to_string()
        ));
    }
    
    if config.min_connections > config.max_connections {
        return Err(PageDropError::Config(
            "Min connections cannot be greater than max connections".to_string()
        ));
    }
    
    Ok(())
}

/// Validate Redis configuration
fn validate_redis_config(config: &super::RedisConfig) -> Result<()> {
    if config.url.is_empty() {
        return Err(PageDropError::Config(
            "Redis URL is required".to_string()
        ));
    }
    
    Ok(())
}

/// Validate object storage configuration
fn validate_storage_config(config: &super::StorageConfig) -> Result<()> {
    if config.backend == StorageBackend::Memory {
        return Ok(());
    }

    if config.bucket.is_empty() {
        return Err(PageDropError::Config(
            "Storage bucket is required".to_string()
        ));
    }

    if config.credentials_json.is_none()
        && config.credentials_path.is_none()
        && config.emulator_token.is_none()
    {
        return Err(PageDropError::Config(
            "Storage credentials (json, path or emulator token) are required".to_string()
        ));
    }

    if config.timeout_seconds == 0 {
        return Err(PageDropError::Config(
            "Storage timeout must be greater than 0".to_string()
        ));
    }

    url::Url::parse(&config.api_url)?;
    url::Url::parse(&config.download_url)?;

    Ok(())
}

/// Validate quota defaults
fn validate_quota_config(config: &super::QuotaConfig) -> Result<()> {
    if config.default_base_limit == 0 {
        return Err(PageDropError::Config(
            "Default base limit must be greater than 0".to_string()
        ));
    }

    if config.default_referral_reward == 0 {
        return Err(PageDropError::Config(
            "Default referral reward must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_session_config(config: &super::SessionConfig) -> Result<()> {
    if config.timeout_seconds == 0 {
        return Err(PageDropError::Config(
            "Session timeout must be greater than 0".to_string()
        ));
    }

    Ok(())
}

fn validate_broadcast_config(config: &super::BroadcastConfig) -> Result<()> {
    if config.messages_per_second == 0 || config.concurrency == 0 {
        return Err(PageDropError::Config(
            "Broadcast rate and concurrency must be greater than 0".to_string()
        ));
    }

    Ok(())
}

/// Validate logging configuration
fn validate_logging_config(config: &super::LoggingConfig) -> Result<()> {
    if config.level.is_empty() {
        return Err(PageDropError::Config(
            "Log level is required".to_string()
        ));
    }
    
    let valid_levels = ["trace", "debug", "info", "warn", "error"];
    if !valid_levels.contains(&config.level.as_str()) {
        return Err(PageDropError::Config(
            format!("Invalid log level: {}. Valid levels: {:?}", config.level, valid_levels)
        ));
    }
    
    Ok(())
}
