//! Logging configuration and setup
//!
//! This module provides logging initialization and structured logging utilities
//! for the PageDrop application.

use tracing::{info, warn, error, debug};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use crate::config::LoggingConfig;
use crate::utils::errors::Result;

/// Initialize logging based on configuration
///
/// The returned guard flushes the file writer on drop and must be held by
/// `main` for as long as the process runs.
pub fn init_logging(config: &LoggingConfig) -> Result<Option<WorkerGuard>> {
    let (file_layer, guard) = match &config.file_path {
        Some(dir) => {
            let file_appender = tracing_appender::rolling::daily(dir, "pagedrop.log");
            let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
            let layer = tracing_subscriber::fmt::layer()
                .with_ansi(false)
                .with_writer(non_blocking);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(&config.level))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stdout))
        .with(file_layer)
        .init();

    info!("Logging initialized with level: {}", config.level);
    Ok(guard)
}

/// Log user actions with structured data
pub fn log_user_action(user_id: i64, action: &str, details: Option<&str>) {
    info!(
        user_id = user_id,
        action = action,
        details = details,
        "User action performed"
    );
}

/// Log admin actions
pub fn log_admin_action(admin_id: i64, action: &str, target: Option<&str>, details: Option<&str>) {
    warn!(
        admin_id = admin_id,
        action = action,
        target = target,
        details = details,
        "Admin action performed"
    );
}

/// Log the outcome of an upload admission check
pub fn log_quota_decision(user_id: i64, admitted: bool, used: u32, total: u32) {
    if admitted {
        debug!(user_id = user_id, used = used, total = total, "Upload slot reserved");
    } else {
        info!(user_id = user_id, used = used, total = total, "Upload rejected: quota exceeded");
    }
}

/// Log object storage operations
pub fn log_storage_operation(operation: &str, path: &str, duration_ms: u64, success: bool) {
    if success {
        debug!(
            operation = operation,
            path = path,
            duration_ms = duration_ms,
            "Storage operation completed"
        );
    } else {
        error!(
            operation = operation,
            path = path,
            duration_ms = duration_ms,
            "Storage operation failed"
        );
    }
}
