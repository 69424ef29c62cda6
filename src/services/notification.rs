//! Outbound message delivery
//!
//! Services never talk to the Bot API directly; they go through
//! [`MessageSender`] so that referral notices and broadcasts can be
//! exercised without Telegram.

use async_trait::async_trait;
use teloxide::{
    prelude::*,
    types::{ChatId, InputFile},
    Bot,
};
use tracing::debug;
use crate::models::BroadcastPayload;
use crate::utils::errors::Result;

#[async_trait]
pub trait MessageSender: Send + Sync + std::fmt::Debug {
    /// Send a plain text message to one chat
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()>;

    /// Re-send an admin-authored broadcast payload to one chat
    async fn send_payload(&self, chat_id: i64, payload: &BroadcastPayload) -> Result<()>;
}

/// [`MessageSender`] backed by the Telegram Bot API
#[derive(Clone)]
pub struct TelegramSender {
    bot: Bot,
}

impl std::fmt::Debug for TelegramSender {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelegramSender").finish_non_exhaustive()
    }
}

impl TelegramSender {
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send_text(&self, chat_id: i64, text: &str) -> Result<()> {
        self.bot.send_message(ChatId(chat_id), text).await?;
        debug!(chat_id = chat_id, "Message sent");
        Ok(())
    }

    async fn send_payload(&self, chat_id: i64, payload: &BroadcastPayload) -> Result<()> {
        let chat = ChatId(chat_id);
        match payload {
            BroadcastPayload::Text(text) => {
                self.bot.send_message(chat, text.clone()).await?;
            }
            BroadcastPayload::Photo { file_id, caption } => {
                let mut request = self.bot.send_photo(chat, InputFile::file_id(file_id.clone()));
                if let Some(caption) = caption {
                    request = request.caption(caption.clone());
                }
                request.await?;
            }
            BroadcastPayload::Video { file_id, caption } => {
                let mut request = self.bot.send_video(chat, InputFile::file_id(file_id.clone()));
                if let Some(caption) = caption {
                    request = request.caption(caption.clone());
                }
                request.await?;
            }
        }
        debug!(chat_id = chat_id, kind = payload.kind(), "Broadcast payload delivered");
        Ok(())
    }
}
