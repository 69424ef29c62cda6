//! Callback query handlers module
//!
//! This module routes inline menu buttons (`user:*` and `admin:*`) to the
//! same handlers the commands use.

use teloxide::{prelude::*, types::{CallbackQuery, ChatId}, Bot};
use tracing::{debug, warn};
use crate::handlers::commands::{admin, files, handle_cancel};
use crate::services::ServiceFactory;
use crate::state::StateStorage;
use crate::utils::errors::Result;

/// Main callback query dispatcher
pub async fn handle_callback_query(
    bot: Bot,
    query: CallbackQuery,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    let user_id = query.from.id.0 as i64;
    let chat_id = query
        .message
        .as_ref()
        .map(|m| m.chat().id)
        .unwrap_or(ChatId(user_id));

    // Answer the callback query first to remove loading state
    if let Err(e) = bot.answer_callback_query(query.id.clone()).await {
        warn!(error = %e, callback_id = %query.id, "Failed to answer callback query");
    }

    let Some(data) = query.data else {
        return Ok(());
    };
    debug!(user_id = user_id, callback_data = %data, "Processing callback query");

    match data.split_once(':') {
        Some(("user", action)) => match action {
            "upload" => files::handle_upload_prompt(bot, chat_id, user_id, services).await,
            "myfiles" => files::handle_my_files(bot, chat_id, user_id, services).await,
            "delete" => files::handle_delete(bot, chat_id, user_id, String::new(), services, state_storage).await,
            "refer" => files::handle_refer(bot, chat_id, user_id, services).await,
            "contact" => files::handle_contact(bot, chat_id, services).await,
            "cancel" => handle_cancel(bot, chat_id, user_id, services, state_storage).await,
            _ => {
                warn!(callback_data = %data, "Unknown user callback");
                Ok(())
            }
        },
        Some(("admin", action)) => match action {
            "files" => admin::handle_list_files(bot, chat_id, user_id, services).await,
            "users" => admin::handle_view_users(bot, chat_id, user_id, services).await,
            "status" => admin::handle_status(bot, chat_id, user_id, services).await,
            "broadcast" => admin::handle_broadcast(bot, chat_id, user_id, services, state_storage).await,
            "ban" => admin::handle_ban(bot, chat_id, user_id, String::new(), services, state_storage).await,
            "unban" => admin::handle_unban(bot, chat_id, user_id, String::new(), services, state_storage).await,
            "slots" => admin::handle_set_slots(bot, chat_id, user_id, String::new(), services, state_storage).await,
            "reward" => admin::handle_set_reward(bot, chat_id, user_id, String::new(), services, state_storage).await,
            _ => {
                warn!(callback_data = %data, "Unknown admin callback");
                Ok(())
            }
        },
        _ => {
            warn!(callback_data = %data, "Invalid callback data format");
            Ok(())
        }
    }
}
