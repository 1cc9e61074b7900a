//! # Configuration Module
//!
//! This module defines the runtime configuration of the bot. Everything is
//! read from environment variables once at start-up and resolved into a
//! [`BotConfig`], including the [`DeploymentMode`] that decides how updates
//! reach the bot.

use anyhow::{anyhow, bail, Context, Result};
use reqwest::Url;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

// Defaults for the tracking lookup
pub const DEFAULT_QUERY_PARAM: &str = "trackingNumber";
pub const DEFAULT_LOOKUP_TIMEOUT_SECS: u64 = 15;
pub const DEFAULT_BREAKER_THRESHOLD: u32 = 5;
pub const DEFAULT_BREAKER_RESET_SECS: u64 = 60;

pub const DEFAULT_ASSETS_DIR: &str = "assets";

/// Video walking the user through finding their tracking code
pub const DEFAULT_TUTORIAL_VIDEO_ID: &str =
    "BAACAgIAAxkBAAIBNmd5WL-Z0oCf9dyQXDIaRdAUeRmlAALNWwACEGzRS_p3atO1dX3KNgQ";

pub const MAX_SECRET_TOKEN_LEN: usize = 256;

/// Settings for the remote tracking API client
#[derive(Debug, Clone)]
pub struct LookupConfig {
    /// Endpoint queried for every tracking code
    pub endpoint: Url,
    /// Name of the query parameter carrying the tracking code
    pub query_param: String,
    /// Upper bound for a single lookup in seconds
    pub timeout_secs: u64,
    /// Consecutive failures before the circuit breaker opens
    pub circuit_breaker_threshold: u32,
    /// Time the breaker stays open before a new attempt, in seconds
    pub circuit_breaker_reset_secs: u64,
}

impl LookupConfig {
    pub fn new(endpoint: Url) -> Self {
        Self {
            endpoint,
            query_param: DEFAULT_QUERY_PARAM.to_string(),
            timeout_secs: DEFAULT_LOOKUP_TIMEOUT_SECS,
            circuit_breaker_threshold: DEFAULT_BREAKER_THRESHOLD,
            circuit_breaker_reset_secs: DEFAULT_BREAKER_RESET_SECS,
        }
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

/// Certificate and private key served in webhook-tls mode
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlsSettings {
    pub cert_path: PathBuf,
    pub key_path: PathBuf,
}

/// Settings for receiving updates through a webhook
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WebhookSettings {
    /// Public domain the chat platform pushes updates to
    pub domain: String,
    /// Endpoint path, always starting with `/`
    pub path: String,
    pub port: u16,
    pub secret_token: Option<String>,
    /// `None` when TLS is terminated by a reverse proxy
    pub tls: Option<TlsSettings>,
}

impl WebhookSettings {
    /// Address the local HTTP(S) server binds to
    pub fn listen_address(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// URL registered with the chat platform
    pub fn public_url(&self) -> Result<Url> {
        let raw = format!("https://{}{}", self.domain, self.path);
        Url::parse(&raw).with_context(|| format!("Invalid webhook URL: {raw}"))
    }
}

/// How updates are delivered to the bot, resolved once at start-up
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeploymentMode {
    /// Continuous long polling
    Polling,
    /// Webhook endpoint, plain HTTP behind a proxy or HTTPS with its own certificate
    Webhook(WebhookSettings),
}

impl DeploymentMode {
    pub fn describe(&self) -> &'static str {
        match self {
            DeploymentMode::Polling => "polling",
            DeploymentMode::Webhook(WebhookSettings { tls: None, .. }) => "webhook-plain",
            DeploymentMode::Webhook(WebhookSettings { tls: Some(_), .. }) => "webhook-tls",
        }
    }
}

/// Complete configuration of the bot
#[derive(Debug, Clone)]
pub struct BotConfig {
    pub bot_token: String,
    pub lookup: LookupConfig,
    pub assets_dir: PathBuf,
    pub tutorial_video_id: String,
    pub deployment: DeploymentMode,
}

impl BotConfig {
    /// Read the configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build the configuration from an arbitrary key lookup
    ///
    /// Blank values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bot_token = get("BOT_TOKEN").ok_or_else(|| anyhow!("BOT_TOKEN must be set"))?;

        let endpoint_raw =
            get("TRACKING_API_URL").ok_or_else(|| anyhow!("TRACKING_API_URL must be set"))?;
        let endpoint = Url::parse(&endpoint_raw)
            .with_context(|| format!("TRACKING_API_URL is not a valid URL: {endpoint_raw}"))?;
        if !matches!(endpoint.scheme(), "http" | "https") {
            bail!("TRACKING_API_URL must use http or https");
        }

        let mut lookup_config = LookupConfig::new(endpoint);
        if let Some(param) = get("TRACKING_API_QUERY_PARAM") {
            lookup_config.query_param = param;
        }
        if let Some(secs) = parse_var::<u64>(&get, "TRACKING_API_TIMEOUT_SECS")? {
            if secs == 0 {
                bail!("TRACKING_API_TIMEOUT_SECS must be greater than zero");
            }
            lookup_config.timeout_secs = secs;
        }
        if let Some(threshold) = parse_var::<u32>(&get, "TRACKING_BREAKER_THRESHOLD")? {
            lookup_config.circuit_breaker_threshold = threshold.max(1);
        }
        if let Some(secs) = parse_var::<u64>(&get, "TRACKING_BREAKER_RESET_SECS")? {
            lookup_config.circuit_breaker_reset_secs = secs;
        }

        let deployment = match get("WEBHOOK_DOMAIN") {
            None => DeploymentMode::Polling,
            Some(domain) => DeploymentMode::Webhook(webhook_settings(&get, domain)?),
        };

        Ok(Self {
            bot_token,
            lookup: lookup_config,
            assets_dir: get("ASSETS_DIR")
                .unwrap_or_else(|| DEFAULT_ASSETS_DIR.to_string())
                .into(),
            tutorial_video_id: get("TUTORIAL_VIDEO_ID")
                .unwrap_or_else(|| DEFAULT_TUTORIAL_VIDEO_ID.to_string()),
            deployment,
        })
    }
}

fn webhook_settings<G>(get: &G, domain: String) -> Result<WebhookSettings>
where
    G: Fn(&str) -> Option<String>,
{
    let domain = domain
        .trim_start_matches("https://")
        .trim_start_matches("http://")
        .trim_end_matches('/')
        .to_string();

    let project = get("WEBHOOK_PATH")
        .ok_or_else(|| anyhow!("WEBHOOK_PATH must be set in webhook mode"))?;
    let path = format!("/{}", project.trim_matches('/'));

    let port = parse_var::<u16>(get, "WEBHOOK_PORT")?
        .ok_or_else(|| anyhow!("WEBHOOK_PORT must be set in webhook mode"))?;

    let secret_token = get("WEBHOOK_SECRET");
    if let Some(secret) = &secret_token {
        validate_secret_token(secret)?;
    }

    let tls = match (get("WEBHOOK_CERT"), get("WEBHOOK_KEY")) {
        (Some(cert), Some(key)) => Some(TlsSettings {
            cert_path: cert.into(),
            key_path: key.into(),
        }),
        (None, None) => None,
        _ => bail!("WEBHOOK_CERT and WEBHOOK_KEY must be set together"),
    };

    Ok(WebhookSettings {
        domain,
        path,
        port,
        secret_token,
        tls,
    })
}

fn parse_var<T>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    get(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| anyhow!("{key} has an invalid value {raw:?}: {e}"))
        })
        .transpose()
}

/// The chat platform only accepts 1-256 characters from `A-Za-z0-9_-`
pub fn validate_secret_token(secret: &str) -> Result<()> {
    if secret.is_empty() || secret.len() > MAX_SECRET_TOKEN_LEN {
        bail!("WEBHOOK_SECRET must be between 1 and {MAX_SECRET_TOKEN_LEN} characters");
    }
    if !secret
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
    {
        bail!("WEBHOOK_SECRET may only contain A-Z, a-z, 0-9, '_' and '-'");
    }
    Ok(())
}
