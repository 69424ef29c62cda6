//! File hosting handlers
//!
//! Upload, listing, deletion and the referral link. These are reachable
//! from commands, from the user menu and (for documents) from plain messages.

use teloxide::{net::Download, prelude::*, types::{ChatId, Document, Message}, Bot};
use tracing::debug;
use crate::handlers::{ensure_not_banned, reply, reply_chunked, texts};
use crate::services::ServiceFactory;
use crate::state::{PendingInput, StateStorage};
use crate::utils::errors::{PageDropError, Result};
use crate::utils::helpers::referral_link;

/// Handle /upload - explain how to upload
pub async fn handle_upload_prompt(bot: Bot, chat_id: ChatId, user_id: i64, services: ServiceFactory) -> Result<()> {
    ensure_not_banned(&services, user_id)?;
    reply(&bot, chat_id, texts::UPLOAD_PROMPT).await
}

/// Handle an incoming document: reserve a slot, fetch it from Telegram and host it
pub async fn handle_document(bot: Bot, msg: &Message, document: &Document, services: ServiceFactory) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| PageDropError::InvalidInput("No user in message".to_string()))?;
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    ensure_not_banned(&services, user_id)?;

    let file_name = document
        .file_name
        .clone()
        .ok_or_else(|| PageDropError::InvalidInput("Please upload an HTML or ZIP file.".to_string()))?;
    debug!(user_id = user_id, file_name = %file_name, size = document.file.size, "Document received");

    // Uploads without a prior /start still get an account
    services
        .user_service
        .register_or_get_user(user_id, Some(user.first_name.clone()))
        .await?;

    reply(&bot, chat_id, texts::UPLOADING).await?;

    let fetch_bot = bot.clone();
    let file_id = document.file.id.clone();
    let fetch = async move {
        let file = fetch_bot.get_file(file_id).await?;
        let mut bytes = Vec::with_capacity(file.size as usize);
        fetch_bot.download_file(&file.path, &mut bytes).await?;
        Ok::<_, PageDropError>(bytes)
    };

    let reported_mime = document.mime_type.as_ref().map(|mime| mime.essence_str());
    let receipt = services
        .file_service
        .upload(user_id, &file_name, reported_mime, fetch)
        .await?;

    reply(&bot, chat_id, texts::upload_success(&receipt)).await
}

/// Handle /myfiles
pub async fn handle_my_files(bot: Bot, chat_id: ChatId, user_id: i64, services: ServiceFactory) -> Result<()> {
    ensure_not_banned(&services, user_id)?;

    let files = services.file_service.list_user_files(user_id).await?;
    if files.is_empty() {
        return reply(&bot, chat_id, texts::NO_FILES).await;
    }

    let stats = services.quota_service.get_stats(user_id).await?;
    reply_chunked(&bot, chat_id, &texts::my_files(&files, &stats)).await
}

/// Handle /delete [name]; without a name, wait for it
pub async fn handle_delete(
    bot: Bot,
    chat_id: ChatId,
    user_id: i64,
    file_name: String,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    ensure_not_banned(&services, user_id)?;

    if file_name.trim().is_empty() {
        let context = state_storage.begin(user_id, PendingInput::AwaitingDeleteFilename).await?;
        return reply(&bot, chat_id, texts::prompt(context.pending)).await;
    }

    delete_file(bot, chat_id, user_id, &file_name, services).await
}

/// Delete one of the user's files
pub async fn delete_file(bot: Bot, chat_id: ChatId, user_id: i64, file_name: &str, services: ServiceFactory) -> Result<()> {
    ensure_not_banned(&services, user_id)?;

    let stats = services.file_service.delete(user_id, file_name).await?;
    reply(&bot, chat_id, texts::file_deleted(file_name.trim(), &stats)).await
}

/// Handle /refer
pub async fn handle_refer(bot: Bot, chat_id: ChatId, user_id: i64, services: ServiceFactory) -> Result<()> {
    ensure_not_banned(&services, user_id)?;

    let stats = services.quota_service.get_stats(user_id).await?;
    let link = referral_link(&services.bot_username, user_id);
    reply(&bot, chat_id, texts::referral_info(&link, &stats)).await
}

/// Contact button of the user menu
pub async fn handle_contact(bot: Bot, chat_id: ChatId, services: ServiceFactory) -> Result<()> {
    match &services.contact_url {
        Some(url) => reply(&bot, chat_id, texts::contact(url)).await,
        None => reply(&bot, chat_id, texts::UNSUPPORTED_MESSAGE).await,
    }
}
