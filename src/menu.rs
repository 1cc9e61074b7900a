//! Inline menu options and their callback data.

use std::fmt;
use std::str::FromStr;

/// Option chosen from an inline keyboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MenuSelection {
    /// "How to use the bot": help document plus tutorial video
    Info,
    /// "Where is my parcel": asks for a tracking code
    Track,
    /// Warehouse address, not available yet
    WarehouseAddress,
    /// Back to the main menu
    Back,
}

impl MenuSelection {
    pub const ALL: [MenuSelection; 4] = [
        MenuSelection::Info,
        MenuSelection::Track,
        MenuSelection::WarehouseAddress,
        MenuSelection::Back,
    ];

    pub fn callback_data(self) -> &'static str {
        match self {
            MenuSelection::Info => "get_info",
            MenuSelection::Track => "get_data",
            MenuSelection::WarehouseAddress => "get_my_id",
            MenuSelection::Back => "get_start",
        }
    }

    /// Catalog key of the button label
    pub fn label_key(self) -> &'static str {
        match self {
            MenuSelection::Info => "menu-info",
            MenuSelection::Track => "menu-track",
            MenuSelection::WarehouseAddress => "menu-warehouse",
            MenuSelection::Back => "menu-back",
        }
    }
}

/// Callback data that matches no menu option
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSelection(pub String);

impl fmt::Display for UnknownSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown menu selection: {:?}", self.0)
    }
}

impl std::error::Error for UnknownSelection {}

impl FromStr for MenuSelection {
    type Err = UnknownSelection;

    fn from_str(data: &str) -> Result<Self, Self::Err> {
        MenuSelection::ALL
            .into_iter()
            .find(|selection| selection.callback_data() == data)
            .ok_or_else(|| UnknownSelection(data.to_string()))
    }
}
