//! Message Handler module for processing incoming Telegram messages

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::debug;

use crate::session::TrackingDialogue;

use super::conversation::ConversationHandler;
use super::outbox::TelegramOutbox;

/// Whether a message is the /start command, optionally addressed to the bot
/// (`/start@name`) or carrying a deep-link payload
pub fn is_start_command(text: &str) -> bool {
    let command = text.split_whitespace().next().unwrap_or_default();
    let command = command.split('@').next().unwrap_or_default();
    command == "/start"
}

/// dptree filter selecting /start messages
pub fn is_start_message(msg: Message) -> bool {
    msg.text().is_some_and(is_start_command)
}

pub async fn start_handler(
    bot: Bot,
    msg: Message,
    conversation: Arc<ConversationHandler>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Ignoring /start without a sender");
        return Ok(());
    };

    let outbox = TelegramOutbox::new(bot, msg.chat.id);
    conversation.on_start(user.id, &outbox).await
}

pub async fn message_handler(
    bot: Bot,
    msg: Message,
    dialogue: TrackingDialogue,
    conversation: Arc<ConversationHandler>,
) -> Result<()> {
    let Some(user) = msg.from.as_ref() else {
        debug!(chat_id = %msg.chat.id, "Ignoring message without a sender");
        return Ok(());
    };

    debug!(
        user_id = %user.id,
        has_text = msg.text().is_some(),
        "Received message from user"
    );

    let outbox = TelegramOutbox::new(bot, msg.chat.id);
    conversation
        .on_message(user.id, &dialogue, msg.text(), &outbox)
        .await
}
