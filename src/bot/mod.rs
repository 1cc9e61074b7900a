//! Bot module for handling Telegram interactions
//!
//! This module is split into several submodules:
//! - `conversation`: the conversation flow, independent of Telegram types
//! - `outbox`: outbound messages to one chat
//! - `message_handler`: /start and free-text messages
//! - `callback_handler`: inline keyboard callback queries
//! - `ui_builder`: inline keyboards

pub mod callback_handler;
pub mod conversation;
pub mod message_handler;
pub mod outbox;
pub mod ui_builder;

pub use conversation::ConversationHandler;
pub use outbox::{ChatOutbox, TelegramOutbox};
