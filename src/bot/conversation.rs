//! Conversation Handler: the start command, menu selections and the
//! tracking-code flow, independent of how updates arrive.

use anyhow::Result;
use std::sync::Arc;
use teloxide::types::UserId;
use tracing::{debug, error, info, warn};

use crate::assets::AssetStore;
use crate::localization::Messages;
use crate::menu::MenuSelection;
use crate::report::{render_report, split_message, MAX_MESSAGE_CHARS};
use crate::session::{self, TrackingDialogue};
use crate::tracking_client::ShipmentLookup;
use crate::tracking_errors::TrackingError;

use super::outbox::ChatOutbox;
use super::ui_builder::{back_keyboard, main_menu_keyboard};

/// Service object shared by all update handlers
pub struct ConversationHandler {
    lookup: Arc<dyn ShipmentLookup>,
    assets: AssetStore,
    messages: Messages,
    tutorial_video_id: String,
}

impl ConversationHandler {
    pub fn new(
        lookup: Arc<dyn ShipmentLookup>,
        assets: AssetStore,
        messages: Messages,
        tutorial_video_id: impl Into<String>,
    ) -> Self {
        Self {
            lookup,
            assets,
            messages,
            tutorial_video_id: tutorial_video_id.into(),
        }
    }

    pub fn messages(&self) -> &Messages {
        &self.messages
    }

    /// Greeting plus the main menu
    pub async fn on_start(&self, user: UserId, out: &dyn ChatOutbox) -> Result<()> {
        info!(user_id = %user, "Received /start command");
        out.send_text(
            self.messages.get("greeting"),
            Some(main_menu_keyboard(&self.messages)),
        )
        .await?;
        Ok(())
    }

    pub async fn on_menu_selection(
        &self,
        user: UserId,
        dialogue: &TrackingDialogue,
        selection: MenuSelection,
        out: &dyn ChatOutbox,
    ) -> Result<()> {
        info!(user_id = %user, selection = ?selection, "Received menu selection");

        match selection {
            MenuSelection::Info => {
                // Help delivery is best effort
                if let Err(e) = self.send_help(out).await {
                    error!(user_id = %user, error = %e, "Failed to send help document");
                }
            }
            MenuSelection::Track => {
                out.send_text(self.messages.get("track-prompt"), None).await?;
                session::begin_tracking(dialogue).await?;
                debug!(user_id = %user, "Awaiting tracking code");
            }
            MenuSelection::WarehouseAddress => {
                out.send_text(
                    self.messages.get("coming-soon"),
                    Some(back_keyboard(&self.messages)),
                )
                .await?;
            }
            MenuSelection::Back => self.on_start(user, out).await?,
        }

        Ok(())
    }

    /// Any message from the user
    ///
    /// Only the first message after the "track" option is a tracking code;
    /// other messages are ignored. `text` is `None` for non-text messages.
    pub async fn on_message(
        &self,
        user: UserId,
        dialogue: &TrackingDialogue,
        text: Option<&str>,
        out: &dyn ChatOutbox,
    ) -> Result<()> {
        if !session::take_pending(dialogue).await {
            debug!(user_id = %user, "Ignoring message outside the tracking flow");
            return Ok(());
        }
        self.on_text_while_pending(user, text.unwrap_or_default(), out)
            .await
    }

    /// Handle a submitted tracking code
    ///
    /// The session must already be reset to Idle by the caller.
    pub async fn on_text_while_pending(
        &self,
        user: UserId,
        text: &str,
        out: &dyn ChatOutbox,
    ) -> Result<()> {
        let tracking_code = text.trim();
        info!(user_id = %user, tracking_code = %tracking_code, "Received tracking code");

        if tracking_code.is_empty() {
            return self.send_invalid_code(out).await;
        }

        let placeholder = out
            .send_text(self.messages.get("request-received"), None)
            .await?;

        let outcome = self.lookup_report(tracking_code).await;

        if let Err(e) = out.delete_message(placeholder).await {
            warn!(user_id = %user, error = %e, "Failed to delete request placeholder");
        }

        match outcome {
            Ok(Some(report)) => {
                info!(user_id = %user, "Sending shipment report");
                if let Err(e) = self.send_report(&report, out).await {
                    error!(user_id = %user, error = %e, "Failed to send shipment report");
                    out.send_text(self.messages.get("lookup-failed"), None)
                        .await?;
                }
            }
            Ok(None) => {
                info!(user_id = %user, tracking_code = %tracking_code, "No shipment found");
                self.send_invalid_code(out).await?;
            }
            Err(e) => {
                error!(user_id = %user, error = %e, "Failed to process tracking code");
                out.send_text(self.messages.get("lookup-failed"), None)
                    .await?;
            }
        }

        Ok(())
    }

    async fn lookup_report(&self, tracking_code: &str) -> Result<Option<String>, TrackingError> {
        let Some(record) = self.lookup.lookup(tracking_code).await? else {
            return Ok(None);
        };
        let template = self.assets.report_template().await?;
        render_report(&template, &record).map(Some)
    }

    async fn send_report(&self, report: &str, out: &dyn ChatOutbox) -> Result<()> {
        for part in split_message(report, MAX_MESSAGE_CHARS) {
            out.send_text(part, None).await?;
        }
        Ok(())
    }

    async fn send_help(&self, out: &dyn ChatOutbox) -> Result<()> {
        let content = self.assets.help_document().await?;
        out.send_text(content, Some(back_keyboard(&self.messages)))
            .await?;
        out.send_video(&self.tutorial_video_id).await?;
        Ok(())
    }

    async fn send_invalid_code(&self, out: &dyn ChatOutbox) -> Result<()> {
        out.send_text(self.messages.get("invalid-code"), None).await?;
        out.send_video(&self.tutorial_video_id).await?;
        Ok(())
    }
}
