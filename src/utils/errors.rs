//! Error handling for PageDrop
//!
//! This module defines the main error types used throughout the application
//! and provides a unified error handling strategy.

use thiserror::Error;

/// Main error type for PageDrop application
#[derive(Error, Debug)]
pub enum PageDropError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Database migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Telegram API error: {0}")]
    Telegram(#[from] teloxide::RequestError),

    #[error("Telegram download error: {0}")]
    Download(#[from] teloxide::DownloadError),

    #[error("Object storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Permission denied: {0}")]
    PermissionDenied(String),

    #[error("User {user_id} is banned")]
    Banned { user_id: i64 },

    #[error("User not found: {user_id}")]
    UserNotFound { user_id: i64 },

    #[error("File not found: {file_name}")]
    FileNotFound { file_name: String },

    #[error("Quota exceeded: {used}/{total} slots in use")]
    QuotaExceeded { used: u32, total: u32 },

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("A broadcast is already waiting for its message")]
    BroadcastPending,

    #[error("Redis error: {0}")]
    Redis(#[from] redis::RedisError),

    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("URL parsing error: {0}")]
    UrlParse(#[from] url::ParseError),

    #[error("Invalid input: {0}")]
    InvalidInput(String),
}

/// Object storage specific errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("Storage request failed: {0}")]
    RequestFailed(String),

    #[error("Object not found: {0}")]
    NotFound(String),

    #[error("Storage authentication failed: {0}")]
    Unauthorized(String),

    #[error("Invalid storage credentials: {0}")]
    Credentials(String),

    #[error("Invalid storage response: {0}")]
    InvalidResponse(String),
}

/// Result type alias for PageDrop operations
pub type Result<T> = std::result::Result<T, PageDropError>;

/// Result type alias for object storage operations
pub type StorageResult<T> = std::result::Result<T, StorageError>;

impl PageDropError {
    /// Check if the error is recoverable
    pub fn is_recoverable(&self) -> bool {
        match self {
            PageDropError::Database(_) => true,
            PageDropError::Migration(_) => false,
            PageDropError::Telegram(_) => true,
            PageDropError::Download(_) => true,
            PageDropError::Storage(_) => true,
            PageDropError::Config(_) => false,
            PageDropError::PermissionDenied(_) => false,
            PageDropError::Banned { .. } => false,
            PageDropError::UserNotFound { .. } => false,
            PageDropError::FileNotFound { .. } => false,
            PageDropError::QuotaExceeded { .. } => false,
            PageDropError::InvalidStateTransition { .. } => false,
            PageDropError::BroadcastPending => true,
            PageDropError::Redis(_) => true,
            PageDropError::Http(_) => true,
            PageDropError::Serialization(_) => false,
            PageDropError::Io(_) => true,
            PageDropError::UrlParse(_) => false,
            PageDropError::InvalidInput(_) => false,
        }
    }

    /// Get error severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            PageDropError::Migration(_) => ErrorSeverity::Critical,
            PageDropError::Config(_) => ErrorSeverity::Critical,
            PageDropError::PermissionDenied(_) => ErrorSeverity::Warning,
            PageDropError::Banned { .. } => ErrorSeverity::Info,
            PageDropError::UserNotFound { .. } => ErrorSeverity::Info,
            PageDropError::FileNotFound { .. } => ErrorSeverity::Info,
            PageDropError::QuotaExceeded { .. } => ErrorSeverity::Info,
            PageDropError::InvalidInput(_) => ErrorSeverity::Info,
            PageDropError::InvalidStateTransition { .. } => ErrorSeverity::Warning,
            PageDropError::BroadcastPending => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Text shown to the chat user when a handler fails with this error
    ///
    /// Collaborator failures collapse to a generic retry hint; the cause is
    /// only logged.
    pub fn user_message(&self) -> String {
        match self {
            PageDropError::PermissionDenied(_) => {
                "❌ You are not authorized to perform this action.".to_string()
            }
            PageDropError::Banned { .. } => "❌ You are banned from using this bot.".to_string(),
            PageDropError::UserNotFound { user_id } => format!("❌ User {} not found.", user_id),
            PageDropError::FileNotFound { file_name } => format!("❌ File {} not found.", file_name),
            PageDropError::QuotaExceeded { used, total } => format!(
                "⚠️ Upload limit reached ({}/{} slots used).\n\
                 Delete a file or invite friends with /refer to earn more slots.",
                used, total
            ),
            PageDropError::InvalidInput(reason) => format!("⚠️ {}", reason),
            PageDropError::BroadcastPending => {
                "⚠️ Another broadcast is already waiting for its message. Try again later.".to_string()
            }
            PageDropError::InvalidStateTransition { .. } => {
                "⚠️ Finish the current action first, or send /cancel.".to_string()
            }
            _ => "❌ Something went wrong. Try again later.".to_string(),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Info,
    Warning,
    Error,
    Critical,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "INFO"),
            ErrorSeverity::Warning => write!(f, "WARN"),
            ErrorSeverity::Error => write!(f, "ERROR"),
            ErrorSeverity::Critical => write!(f, "CRITICAL"),
        }
    }
}
