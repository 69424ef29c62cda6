//! Admin command handlers
//!
//! Every entry point checks admin rights first. Handlers that take a value
//! arm the matching pending input when called without one; the `apply_*`
//! functions do the work once the value is known.

use teloxide::{types::{ChatId, Message}, Bot};
use tracing::info;
use crate::handlers::{reply, reply_chunked, texts};
use crate::models::BroadcastPayload;
use crate::services::ServiceFactory;
use crate::state::{PendingInput, StateStorage};
use crate::utils::errors::{PageDropError, Result};
use crate::utils::helpers::{parse_positive_count, parse_user_id};
use crate::utils::logging::log_admin_action;

/// Arm `pending` for the admin and send its prompt
async fn await_input(
    bot: &Bot,
    chat_id: ChatId,
    admin_id: i64,
    pending: PendingInput,
    state_storage: &StateStorage,
) -> Result<()> {
    state_storage.begin(admin_id, pending).await?;
    reply(bot, chat_id, texts::prompt(pending)).await
}

/// Handle /viewusers
pub async fn handle_view_users(bot: Bot, chat_id: ChatId, admin_id: i64, services: ServiceFactory) -> Result<()> {
    services.auth_service.require_admin(admin_id, "view users")?;

    let users = services.user_service.list_users().await?;
    if users.is_empty() {
        return reply(&bot, chat_id, texts::NO_USERS).await;
    }
    reply_chunked(&bot, chat_id, &texts::user_list(&users)).await
}

/// Handle /status
pub async fn handle_status(bot: Bot, chat_id: ChatId, admin_id: i64, services: ServiceFactory) -> Result<()> {
    services.auth_service.require_admin(admin_id, "status")?;

    let defaults = services.quota_defaults.current();
    let report = texts::StatusReport {
        total_users: services.user_service.count_users().await?,
        users_today: services.daily_usage_service.today_count().await?,
        banned_users: services.moderation_service.banned_count(),
        total_files: services.file_service.list_all_files().await?.len(),
        default_base_limit: defaults.default_base_limit,
        referral_reward: defaults.default_referral_reward,
    };
    reply(&bot, chat_id, texts::status(&report)).await
}

/// Handle /listfiles
pub async fn handle_list_files(bot: Bot, chat_id: ChatId, admin_id: i64, services: ServiceFactory) -> Result<()> {
    services.auth_service.require_admin(admin_id, "list files")?;

    let files = services.file_service.list_all_files().await?;
    if files.is_empty() {
        return reply(&bot, chat_id, texts::NO_FILES_AT_ALL).await;
    }
    reply_chunked(&bot, chat_id, &texts::all_files(&files)).await
}

/// Handle /banuser [id]
pub async fn handle_ban(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    target: String,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    services.auth_service.require_admin(admin_id, "ban user")?;

    if target.trim().is_empty() {
        return await_input(&bot, chat_id, admin_id, PendingInput::AwaitingBanTarget, &state_storage).await;
    }
    apply_ban(bot, chat_id, admin_id, &target, services).await
}

pub async fn apply_ban(bot: Bot, chat_id: ChatId, admin_id: i64, target: &str, services: ServiceFactory) -> Result<()> {
    let user_id = parse_user_id(target)?;
    if services.auth_service.is_admin(user_id) {
        return Err(PageDropError::InvalidInput("Admins cannot be banned.".to_string()));
    }

    let newly = services.moderation_service.ban(user_id);
    log_admin_action(admin_id, "ban_user", Some(&user_id.to_string()), None);
    reply(&bot, chat_id, texts::banned(user_id, newly)).await
}

/// Handle /unbanuser [id]
pub async fn handle_unban(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    target: String,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    services.auth_service.require_admin(admin_id, "unban user")?;

    if target.trim().is_empty() {
        return await_input(&bot, chat_id, admin_id, PendingInput::AwaitingUnbanTarget, &state_storage).await;
    }
    apply_unban(bot, chat_id, admin_id, &target, services).await
}

pub async fn apply_unban(bot: Bot, chat_id: ChatId, admin_id: i64, target: &str, services: ServiceFactory) -> Result<()> {
    let user_id = parse_user_id(target)?;
    let was_banned = services.moderation_service.unban(user_id);
    log_admin_action(admin_id, "unban_user", Some(&user_id.to_string()), None);
    reply(&bot, chat_id, texts::unbanned(user_id, was_banned)).await
}

/// Handle /setslots [n]
pub async fn handle_set_slots(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    value: String,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    services.auth_service.require_admin(admin_id, "set slots")?;

    if value.trim().is_empty() {
        return await_input(&bot, chat_id, admin_id, PendingInput::AwaitingSlotEdit, &state_storage).await;
    }
    apply_slot_edit(bot, chat_id, admin_id, &value, services).await
}

pub async fn apply_slot_edit(bot: Bot, chat_id: ChatId, admin_id: i64, value: &str, services: ServiceFactory) -> Result<()> {
    let limit = parse_positive_count(value)?;
    let report = services.admin_config_service.set_default_base_limit(limit).await?;
    log_admin_action(admin_id, "set_slots", None, Some(&limit.to_string()));
    reply(&bot, chat_id, texts::bulk_update("Base slot limit", limit, &report)).await
}

/// Handle /setreward [n]
pub async fn handle_set_reward(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    value: String,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    services.auth_service.require_admin(admin_id, "set reward")?;

    if value.trim().is_empty() {
        return await_input(&bot, chat_id, admin_id, PendingInput::AwaitingRewardEdit, &state_storage).await;
    }
    apply_reward_edit(bot, chat_id, admin_id, &value, services).await
}

pub async fn apply_reward_edit(bot: Bot, chat_id: ChatId, admin_id: i64, value: &str, services: ServiceFactory) -> Result<()> {
    let reward = parse_positive_count(value)?;
    let report = services.admin_config_service.set_referral_reward(reward).await?;
    log_admin_action(admin_id, "set_reward", None, Some(&reward.to_string()));
    reply(&bot, chat_id, texts::bulk_update("Slots per referral", reward, &report)).await
}

/// Handle /deleteuserfiles <id>
pub async fn handle_delete_user_files(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    target: String,
    services: ServiceFactory,
) -> Result<()> {
    services.auth_service.require_admin(admin_id, "delete user files")?;

    if target.trim().is_empty() {
        return Err(PageDropError::InvalidInput("Usage: /deleteuserfiles <user_id>".to_string()));
    }
    let user_id = parse_user_id(&target)?;
    let report = services.file_service.delete_user_files(user_id).await?;
    let details = format!("deleted={} failed={}", report.deleted, report.failed.len());
    log_admin_action(admin_id, "delete_user_files", Some(&user_id.to_string()), Some(&details));
    reply(&bot, chat_id, texts::user_files_deleted(user_id, &report)).await
}

/// Handle /broadcast - take the broadcast gate and wait for the message
pub async fn handle_broadcast(
    bot: Bot,
    chat_id: ChatId,
    admin_id: i64,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    services.auth_service.require_admin(admin_id, "broadcast")?;

    let gate = services.broadcast_service.gate();
    gate.arm(admin_id)?;
    if let Err(e) = state_storage.begin(admin_id, PendingInput::AwaitingBroadcastPayload).await {
        gate.disarm(admin_id);
        return Err(e);
    }

    log_admin_action(admin_id, "broadcast_armed", None, None);
    reply(&bot, chat_id, texts::prompt(PendingInput::AwaitingBroadcastPayload)).await
}

/// Turn the admin's message into a broadcast payload
pub fn extract_payload(msg: &Message) -> Result<BroadcastPayload> {
    if let Some(text) = msg.text() {
        return Ok(BroadcastPayload::Text(text.to_string()));
    }

    let caption = msg.caption().map(str::to_string);
    if let Some(photo) = msg.photo().and_then(|sizes| sizes.last()) {
        return Ok(BroadcastPayload::Photo {
            file_id: photo.file.id.clone(),
            caption,
        });
    }
    if let Some(video) = msg.video() {
        return Ok(BroadcastPayload::Video {
            file_id: video.file.id.clone(),
            caption,
        });
    }

    Err(PageDropError::InvalidInput("Send text, an image or a video to broadcast.".to_string()))
}

/// Consume the armed broadcast with `msg` as its payload and fan it out
pub async fn apply_broadcast(bot: Bot, chat_id: ChatId, admin_id: i64, msg: &Message, services: ServiceFactory) -> Result<()> {
    let payload = extract_payload(msg)?;

    if !services.broadcast_service.gate().take(admin_id) {
        return reply(&bot, chat_id, texts::BROADCAST_EXPIRED).await;
    }

    info!(admin_id = admin_id, kind = payload.kind(), "Broadcast payload captured");
    let report = services.broadcast_service.broadcast(&payload).await?;
    log_admin_action(
        admin_id,
        "broadcast",
        None,
        Some(&format!("delivered {}/{}", report.delivered, report.total)),
    );
    reply(&bot, chat_id, texts::broadcast_finished(&report)).await
}
