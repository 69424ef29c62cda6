//! Bot handlers module
//!
//! This module contains all Telegram bot handlers organized by type:
//! - Command handlers for bot commands
//! - Callback handlers for inline keyboard interactions
//! - Message handlers for documents and pending-input replies
//!
//! Handlers return errors instead of replying to them; [`report_error`] is
//! the boundary that logs a failure and tells the user.

pub mod callbacks;
pub mod commands;
pub mod keyboards;
pub mod messages;
pub mod texts;

// Re-export commonly used handler functions
pub use callbacks::handle_callback_query;
pub use commands::{handle_command, Command};
pub use messages::handle_message;

use teloxide::{prelude::*, types::{ChatId, ParseMode}, Bot};
use tracing::{error, info, warn};
use crate::services::ServiceFactory;
use crate::utils::errors::{ErrorSeverity, PageDropError, Result};

/// Telegram rejects messages longer than this
const MAX_MESSAGE_LEN: usize = 4000;

/// Send an HTML-formatted reply
pub async fn reply(bot: &Bot, chat_id: ChatId, text: impl Into<String>) -> Result<()> {
    bot.send_message(chat_id, text.into())
        .parse_mode(ParseMode::Html)
        .await?;
    Ok(())
}

/// Send a long HTML reply split on line boundaries
pub async fn reply_chunked(bot: &Bot, chat_id: ChatId, text: &str) -> Result<()> {
    for chunk in split_message(text, MAX_MESSAGE_LEN) {
        reply(bot, chat_id, chunk).await?;
    }
    Ok(())
}

fn split_message(text: &str, limit: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current = String::new();

    for line in text.lines() {
        if !current.is_empty() && current.len() + line.len() + 1 > limit {
            chunks.push(std::mem::take(&mut current));
        }
        current.push_str(line);
        current.push('\n');
    }
    if !current.trim().is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Fail with `Banned` for banned users
pub fn ensure_not_banned(services: &ServiceFactory, user_id: i64) -> Result<()> {
    if services.moderation_service.is_banned(user_id) {
        return Err(PageDropError::Banned { user_id });
    }
    Ok(())
}

/// Log a handler failure and tell the user what went wrong
pub async fn report_error(bot: &Bot, chat_id: ChatId, user_id: i64, err: &PageDropError) {
    match err.severity() {
        ErrorSeverity::Info => info!(user_id = user_id, error = %err, "Request rejected"),
        ErrorSeverity::Warning => warn!(user_id = user_id, error = %err, "Request refused"),
        ErrorSeverity::Error | ErrorSeverity::Critical => {
            error!(user_id = user_id, error = %err, recoverable = err.is_recoverable(), "Handler failed")
        }
    }

    if let Err(e) = bot.send_message(chat_id, err.user_message()).await {
        error!(user_id = user_id, error = %e, "Failed to send error reply");
    }
}
