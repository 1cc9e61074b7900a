use anyhow::Result;
use std::path::PathBuf;
use std::sync::Arc;
use teloxide::prelude::*;
use tracing::info;

use global_trade_bot::assets::AssetStore;
use global_trade_bot::bot::ConversationHandler;
use global_trade_bot::config::BotConfig;
use global_trade_bot::localization::Messages;
use global_trade_bot::tracking_client::HttpShipmentLookup;
use global_trade_bot::{logging, transport};

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    let log_file = std::env::var_os("LOG_FILE").map(PathBuf::from);
    logging::init(log_file.as_deref())?;

    info!("Starting Global Trade Telegram Bot");

    let config = BotConfig::from_env()?;
    info!(
        mode = config.deployment.describe(),
        tracking_api = %config.lookup.endpoint,
        assets_dir = %config.assets_dir.display(),
        "Configuration loaded"
    );

    let lookup = Arc::new(HttpShipmentLookup::new(config.lookup.clone())?);
    let conversation = Arc::new(ConversationHandler::new(
        lookup,
        AssetStore::new(config.assets_dir.clone()),
        Messages::new()?,
        config.tutorial_video_id.clone(),
    ));

    let bot = Bot::new(config.bot_token.clone());

    transport::run(bot, conversation, &config.deployment).await
}
