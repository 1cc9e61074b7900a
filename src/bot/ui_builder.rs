//! UI Builder module for creating keyboards

use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use crate::localization::Messages;
use crate::menu::MenuSelection;

fn menu_button(messages: &Messages, selection: MenuSelection) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(messages.get(selection.label_key()), selection.callback_data())
}

/// Main menu shown after /start, one option per row
pub fn main_menu_keyboard(messages: &Messages) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(
        [
            MenuSelection::Info,
            MenuSelection::Track,
            MenuSelection::WarehouseAddress,
        ]
        .into_iter()
        .map(|selection| vec![menu_button(messages, selection)]),
    )
}

/// Single "back" button returning to the main menu
pub fn back_keyboard(messages: &Messages) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![vec![menu_button(messages, MenuSelection::Back)]])
}
