//! Command handlers module
//!
//! This module contains handlers for all bot commands like /start, /help, etc.
//! Commands that take an argument arm the matching pending input when sent
//! without one.

pub mod admin;
pub mod files;
pub mod help;
pub mod start;

use teloxide::{types::{ChatId, Message}, utils::command::BotCommands, Bot};
use crate::handlers::{reply, texts};
use crate::services::ServiceFactory;
use crate::state::StateStorage;
use crate::utils::errors::{PageDropError, Result};

/// All available bot commands
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "PageDrop commands:")]
pub enum Command {
    #[command(description = "Start the bot")]
    Start(String),
    #[command(description = "Show help information")]
    Help,
    #[command(description = "Upload an HTML or ZIP file")]
    Upload,
    #[command(description = "List your hosted files")]
    MyFiles,
    #[command(description = "Delete one of your files")]
    Delete(String),
    #[command(description = "Get your referral link")]
    Refer,
    #[command(description = "Cancel the current action")]
    Cancel,
    #[command(description = "View all users (admin only)")]
    ViewUsers,
    #[command(description = "Ban a user (admin only)")]
    BanUser(String),
    #[command(description = "Unban a user (admin only)")]
    UnbanUser(String),
    #[command(description = "Show bot status (admin only)")]
    Status,
    #[command(description = "List all hosted files (admin only)")]
    ListFiles,
    #[command(description = "Set the base slot limit for everyone (admin only)")]
    SetSlots(String),
    #[command(description = "Set slots granted per referral (admin only)")]
    SetReward(String),
    #[command(description = "Broadcast a message to all users (admin only)")]
    Broadcast,
    #[command(description = "Delete all files of a user (admin only)")]
    DeleteUserFiles(String),
}

/// Main command dispatcher
pub async fn handle_command(
    bot: Bot,
    msg: Message,
    cmd: Command,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| PageDropError::InvalidInput("No user in message".to_string()))?;
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    match cmd {
        Command::Start(payload) => start::handle_start(bot, msg, payload, services).await,
        Command::Help => help::handle_help(bot, chat_id, user_id, services).await,
        Command::Upload => files::handle_upload_prompt(bot, chat_id, user_id, services).await,
        Command::MyFiles => files::handle_my_files(bot, chat_id, user_id, services).await,
        Command::Delete(name) => files::handle_delete(bot, chat_id, user_id, name, services, state_storage).await,
        Command::Refer => files::handle_refer(bot, chat_id, user_id, services).await,
        Command::Cancel => handle_cancel(bot, chat_id, user_id, services, state_storage).await,
        Command::ViewUsers => admin::handle_view_users(bot, chat_id, user_id, services).await,
        Command::BanUser(target) => admin::handle_ban(bot, chat_id, user_id, target, services, state_storage).await,
        Command::UnbanUser(target) => admin::handle_unban(bot, chat_id, user_id, target, services, state_storage).await,
        Command::Status => admin::handle_status(bot, chat_id, user_id, services).await,
        Command::ListFiles => admin::handle_list_files(bot, chat_id, user_id, services).await,
        Command::SetSlots(value) => admin::handle_set_slots(bot, chat_id, user_id, value, services, state_storage).await,
        Command::SetReward(value) => admin::handle_set_reward(bot, chat_id, user_id, value, services, state_storage).await,
        Command::Broadcast => admin::handle_broadcast(bot, chat_id, user_id, services, state_storage).await,
        Command::DeleteUserFiles(target) => admin::handle_delete_user_files(bot, chat_id, user_id, target, services).await,
    }
}

/// Handle /cancel - drop whatever input is pending
pub async fn handle_cancel(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    let pending = state_storage.finish(user_id).await?;
    services.broadcast_service.gate().disarm(user_id);

    let text = if pending.is_some() { texts::CANCELLED } else { texts::NOTHING_TO_CANCEL };
    reply(&bot, chat_id, text).await
}
