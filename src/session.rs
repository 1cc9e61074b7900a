//! Per-chat conversation state, kept in teloxide's dialogue storage.

use anyhow::Result;
use teloxide::dispatching::dialogue::{Dialogue, InMemStorage};

/// Whether the next message in a chat is a tracking code
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum SessionState {
    #[default]
    Idle,
    AwaitingTrackingCode,
}

/// Storage backing every [`TrackingDialogue`]
pub type SessionStorage = InMemStorage<SessionState>;

/// Type alias for our tracking dialogue
pub type TrackingDialogue = Dialogue<SessionState, SessionStorage>;

/// Current state, `Idle` when nothing is stored
pub async fn current_state(dialogue: &TrackingDialogue) -> Result<SessionState> {
    Ok(dialogue.get().await?.unwrap_or_default())
}

/// Idle -> AwaitingTrackingCode
pub async fn begin_tracking(dialogue: &TrackingDialogue) -> Result<()> {
    dialogue.update(SessionState::AwaitingTrackingCode).await?;
    Ok(())
}

/// Reset the chat to Idle, reporting whether a tracking code was pending
///
/// Idle chats have no stored entry, so removing one means a code was
/// pending. The storage removes under its lock: of two concurrent messages
/// only one is treated as the tracking code.
pub async fn take_pending(dialogue: &TrackingDialogue) -> bool {
    dialogue.exit().await.is_ok()
}
