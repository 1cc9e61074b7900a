//! Callback Handler module for processing inline keyboard callback queries

use anyhow::Result;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::{debug, warn};

use crate::menu::MenuSelection;
use crate::session::TrackingDialogue;

use super::conversation::ConversationHandler;
use super::outbox::TelegramOutbox;

/// Handle callback queries from inline keyboards
pub async fn callback_handler(
    bot: Bot,
    q: CallbackQuery,
    dialogue: TrackingDialogue,
    conversation: Arc<ConversationHandler>,
) -> Result<()> {
    debug!(user_id = %q.from.id, data = ?q.data, "Received callback query from user");

    match (q.message.as_ref(), q.data.as_deref()) {
        (Some(msg), Some(data)) => match data.parse::<MenuSelection>() {
            Ok(selection) => {
                let outbox = TelegramOutbox::new(bot.clone(), msg.chat().id);
                conversation
                    .on_menu_selection(q.from.id, &dialogue, selection, &outbox)
                    .await?;
            }
            Err(e) => {
                warn!(user_id = %q.from.id, error = %e, "Ignoring unknown callback data");
            }
        },
        _ => {
            debug!(user_id = %q.from.id, "Callback query without message or data");
        }
    }

    // Answer the callback query to remove the loading state
    bot.answer_callback_query(q.id).await?;

    Ok(())
}
