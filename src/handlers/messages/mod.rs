//! Message handlers module
//!
//! Handles documents (uploads) and plain messages that answer a pending
//! input.

use teloxide::{types::Message, Bot};
use tracing::debug;
use crate::handlers::commands::{admin, files};
use crate::handlers::{reply, texts};
use crate::services::{BroadcastGate, ServiceFactory};
use crate::state::{ConversationContext, PendingInput, StateStorage};
use crate::utils::errors::{PageDropError, Result};

/// Handle incoming non-command messages
pub async fn handle_message(
    bot: Bot,
    msg: Message,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    let user = msg
        .from
        .as_ref()
        .ok_or_else(|| PageDropError::InvalidInput("No user in message".to_string()))?;
    let user_id = user.id.0 as i64;
    let chat_id = msg.chat.id;

    // Group chatter is not for us
    if !chat_id.is_user() {
        return Ok(());
    }

    debug!(user_id = user_id, chat_id = ?chat_id, "Processing message");
    let context = state_storage.load_context(user_id).await?;

    // A pending broadcast takes whatever the admin sends next
    if let Some(context) = &context {
        if context.pending == PendingInput::AwaitingBroadcastPayload {
            return handle_pending_input(bot, msg.clone(), context.clone(), services, state_storage).await;
        }
    }

    if let Some(document) = msg.document() {
        return files::handle_document(bot, &msg, document, services).await;
    }

    match context {
        Some(context) => handle_pending_input(bot, msg, context, services, state_storage).await,
        None => reply(&bot, chat_id, texts::UNSUPPORTED_MESSAGE).await,
    }
}

/// Errors after which the same input may simply be sent again
fn keeps_input_pending(err: &PageDropError) -> bool {
    matches!(err, PageDropError::InvalidInput(_) | PageDropError::FileNotFound { .. })
}

/// Feed a message to the issuer's armed expectation
async fn handle_pending_input(
    bot: Bot,
    msg: Message,
    context: ConversationContext,
    services: ServiceFactory,
    state_storage: StateStorage,
) -> Result<()> {
    let user_id = context.user_id;
    let chat_id = msg.chat.id;

    if context.pending.requires_admin() {
        if let Err(e) = services.auth_service.require_admin(user_id, context.pending.name()) {
            return settle_pending(&state_storage, services.broadcast_service.gate(), &context, Err(e)).await;
        }
    }

    let result = match (context.pending, msg.text()) {
        (PendingInput::AwaitingBroadcastPayload, _) => {
            admin::apply_broadcast(bot, chat_id, user_id, &msg, services.clone()).await
        }
        (_, None) => Err(PageDropError::InvalidInput("Please send the answer as text.".to_string())),
        (PendingInput::AwaitingBanTarget, Some(text)) => {
            admin::apply_ban(bot, chat_id, user_id, text, services.clone()).await
        }
        (PendingInput::AwaitingUnbanTarget, Some(text)) => {
            admin::apply_unban(bot, chat_id, user_id, text, services.clone()).await
        }
        (PendingInput::AwaitingSlotEdit, Some(text)) => {
            admin::apply_slot_edit(bot, chat_id, user_id, text, services.clone()).await
        }
        (PendingInput::AwaitingRewardEdit, Some(text)) => {
            admin::apply_reward_edit(bot, chat_id, user_id, text, services.clone()).await
        }
        (PendingInput::AwaitingDeleteFilename, Some(text)) => {
            files::delete_file(bot, chat_id, user_id, text, services.clone()).await
        }
    };

    settle_pending(&state_storage, services.broadcast_service.gate(), &context, result).await
}

/// Move the issuer's state on from the outcome of a pending input
///
/// Success returns the issuer to idle. A validation failure keeps the
/// expectation armed so the user can try again; any other failure drops it
/// and releases a broadcast capture the issuer held.
pub async fn settle_pending(
    state_storage: &StateStorage,
    gate: &BroadcastGate,
    context: &ConversationContext,
    result: Result<()>,
) -> Result<()> {
    let user_id = context.user_id;
    match result {
        Ok(()) => {
            state_storage.finish(user_id).await?;
            Ok(())
        }
        Err(e) if keeps_input_pending(&e) => Err(e),
        Err(e) => {
            state_storage.finish(user_id).await?;
            if context.pending == PendingInput::AwaitingBroadcastPayload {
                gate.disarm(user_id);
            }
            Err(e)
        }
    }
}
