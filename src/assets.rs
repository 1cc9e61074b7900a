//! Static asset files read from disk on every request, so they can be edited
//! without restarting the bot.

use std::path::PathBuf;

use crate::tracking_errors::TrackingError;

pub const HELP_DOCUMENT: &str = "desc.html";
pub const REPORT_TEMPLATE: &str = "send_data.html";

#[derive(Debug, Clone)]
pub struct AssetStore {
    dir: PathBuf,
}

impl AssetStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// "How to use the bot" document sent for the info menu option
    pub async fn help_document(&self) -> Result<String, TrackingError> {
        self.read(HELP_DOCUMENT).await
    }

    /// Report template with two positional slots: waybill number, quantity
    pub async fn report_template(&self) -> Result<String, TrackingError> {
        self.read(REPORT_TEMPLATE).await
    }

    async fn read(&self, name: &str) -> Result<String, TrackingError> {
        let path = self.dir.join(name);
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|e| TrackingError::Asset(format!("{}: {e}", path.display())))
    }
}
