use anyhow::{anyhow, Result};
use fluent_bundle::concurrent::FluentBundle;
use fluent_bundle::FluentResource;
use unic_langid::LanguageIdentifier;

/// Locale every message is written in
pub const DEFAULT_LOCALE: &str = "ru";

const MAIN_RESOURCE: &str = include_str!("../locales/ru/main.ftl");

/// Message catalog for the bot's user-facing texts
pub struct Messages {
    bundle: FluentBundle<FluentResource>,
}

impl Messages {
    /// Load the catalog embedded in the binary
    pub fn new() -> Result<Self> {
        Self::from_source(MAIN_RESOURCE)
    }

    /// Build a catalog from Fluent source text
    pub fn from_source(source: &str) -> Result<Self> {
        let locale: LanguageIdentifier = DEFAULT_LOCALE.parse()?;
        let resource = FluentResource::try_new(source.to_string())
            .map_err(|(_, errors)| anyhow!("Failed to parse messages: {errors:?}"))?;

        let mut bundle = FluentBundle::new_concurrent(vec![locale]);
        // Unicode isolation marks would leak into Telegram messages
        bundle.set_use_isolating(false);
        bundle
            .add_resource(resource)
            .map_err(|errors| anyhow!("Duplicate message ids: {errors:?}"))?;

        Ok(Self { bundle })
    }

    /// Get a message by key
    pub fn get(&self, key: &str) -> String {
        let msg = match self.bundle.get_message(key) {
            Some(msg) => msg,
            None => return format!("Missing translation: {}", key),
        };

        let pattern = match msg.value() {
            Some(pattern) => pattern,
            None => return format!("Missing value for key: {}", key),
        };

        let mut errors = vec![];
        self.bundle
            .format_pattern(pattern, None, &mut errors)
            .into_owned()
    }
}
