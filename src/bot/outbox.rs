//! Outbound side of a conversation: everything the bot sends to one chat.

use anyhow::Result;
use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{FileId, InlineKeyboardMarkup, InputFile, MessageId, ParseMode};

/// Messages sent to the chat the current update came from
#[async_trait]
pub trait ChatOutbox: Send + Sync {
    /// Send an HTML-formatted text, returning its id
    async fn send_text(
        &self,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageId>;

    /// Send a video already stored by the chat platform
    async fn send_video(&self, file_id: &str) -> Result<()>;

    async fn delete_message(&self, message_id: MessageId) -> Result<()>;
}

/// [`ChatOutbox`] delivering through the Telegram Bot API
#[derive(Clone, Debug)]
pub struct TelegramOutbox {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramOutbox {
    pub fn new(bot: Bot, chat_id: ChatId) -> Self {
        Self { bot, chat_id }
    }
}

#[async_trait]
impl ChatOutbox for TelegramOutbox {
    async fn send_text(
        &self,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<MessageId> {
        let request = self
            .bot
            .send_message(self.chat_id, text)
            .parse_mode(ParseMode::Html);

        let sent = match keyboard {
            Some(keyboard) => request.reply_markup(keyboard).await?,
            None => request.await?,
        };
        Ok(sent.id)
    }

    async fn send_video(&self, file_id: &str) -> Result<()> {
        self.bot
            .send_video(self.chat_id, InputFile::file_id(FileId(file_id.to_string())))
            .await?;
        Ok(())
    }

    async fn delete_message(&self, message_id: MessageId) -> Result<()> {
        self.bot.delete_message(self.chat_id, message_id).await?;
        Ok(())
    }
}
