//! Start command handler
//!
//! Handles /start: daily usage tracking, account creation on first contact
//! and referral crediting for brand new accounts.

use teloxide::{prelude::*, types::{Message, ParseMode}, Bot};
use tracing::debug;
use crate::handlers::{keyboards, texts};
use crate::services::{Onboarding, ServiceFactory};
use crate::utils::errors::{PageDropError, Result};

/// Handle /start command - main entry point for new and returning users
pub async fn handle_start(bot: Bot, msg: Message, payload: String, services: ServiceFactory) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| PageDropError::InvalidInput("No user in message".to_string()))?;

    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    debug!(user_id = user_id, chat_id = ?chat_id, "Processing /start command");
    let Onboarding { account, .. } = services
        .onboard(user_id, Some(user.first_name.clone()), &payload)
        .await?;

    if services.auth_service.is_admin(user_id) {
        bot.send_message(chat_id, texts::welcome_admin(&account.name))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::admin_menu())
            .await?;
    } else {
        bot.send_message(chat_id, texts::welcome_user(&account.name, &account.stats))
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboards::user_menu(services.contact_url.is_some()))
            .await?;
    }

    Ok(())
}
