//! Help command handler

use teloxide::{types::ChatId, Bot};
use crate::handlers::{ensure_not_banned, reply, texts};
use crate::services::ServiceFactory;
use crate::utils::errors::Result;

/// Handle /help command
pub async fn handle_help(bot: Bot, chat_id: ChatId, user_id: i64, services: ServiceFactory) -> Result<()> {
    ensure_not_banned(&services, user_id)?;

    let text = if services.auth_service.is_admin(user_id) {
        texts::admin_help()
    } else {
        texts::user_help()
    };
    reply(&bot, chat_id, text).await
}
