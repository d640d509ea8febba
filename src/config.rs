//! Configuration and settings management
//!
//! Loads bot settings from environment variables / config files and the
//! Unsplash provider configuration from its JSON file.

use config::{Config, ConfigError, Environment, File, FileFormat};
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::net::SocketAddr;

/// How the bot receives updates from Telegram
#[derive(Debug, Deserialize, Serialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum TransportMode {
    /// Long polling via `getUpdates`
    #[default]
    Polling,
    /// Webhook listener bound to `0.0.0.0:{port}`
    Webhook,
}

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token
    pub telegram_token: String,

    /// Update transport (polling or webhook)
    #[serde(default)]
    pub transport_mode: TransportMode,

    /// Public base URL of the webhook; the token is appended as the path
    pub webhook_url: Option<String>,

    /// Port for the webhook listener
    #[serde(default = "default_port")]
    pub port: u16,

    /// Answer inline queries with text-transform examples
    #[serde(default)]
    pub inline_mode: bool,

    /// Reply to non-command text messages with a hint
    #[serde(default)]
    pub catch_all_reply: bool,

    /// Path to the Unsplash JSON configuration file
    #[serde(default = "default_unsplash_config_path")]
    pub unsplash_config_path: String,
}

const fn default_port() -> u16 {
    5000
}

fn default_unsplash_config_path() -> String {
    "configuration.json".to_string()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use unsplash_relay_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Not checked into git
            .add_source(File::with_name("config/local").required(false))
            .add_source(Environment::with_prefix("APP").separator("__"))
            // UPPER_SNAKE_CASE variables map onto snake_case keys, empty ones count as unset
            .add_source(
                Environment::default()
                    .ignore_empty(true)
                    .try_parsing(true),
            )
            .build()?;

        s.try_deserialize()
    }

    /// Listener address and full public URL for webhook mode.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if `webhook_url` is missing or not a valid URL.
    pub fn webhook_endpoint(&self) -> Result<(SocketAddr, Url), ConfigError> {
        let base = self
            .webhook_url
            .as_deref()
            .filter(|s| !s.trim().is_empty())
            .ok_or_else(|| ConfigError::NotFound("webhook_url".to_string()))?;

        let url = Url::parse(&format!(
            "{}/{}",
            base.trim_end_matches('/'),
            self.telegram_token
        ))
        .map_err(|e| ConfigError::Message(format!("Invalid webhook_url: {e}")))?;

        Ok((SocketAddr::from(([0, 0, 0, 0], self.port)), url))
    }
}

/// Unsplash API access settings, read once at startup
#[derive(Deserialize, Clone)]
pub struct ProviderConfig {
    /// API root, e.g. `https://api.unsplash.com`
    pub base_url: String,
    /// Application access key sent as `client_id`
    pub access_key: String,
    /// Initial value of the remaining-requests counter
    pub request_limit: i64,
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("base_url", &self.base_url)
            .field("access_key", &"[MASKED]")
            .field("request_limit", &self.request_limit)
            .finish()
    }
}

impl ProviderConfig {
    /// Load the provider configuration from a JSON file.
    ///
    /// `UNSPLASH_BASE_URL`, `UNSPLASH_ACCESS_KEY` and `UNSPLASH_REQUEST_LIMIT`
    /// override the corresponding file keys.
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if the file is missing, is not valid JSON or
    /// lacks one of the required keys.
    pub fn from_file(path: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::new(path, FileFormat::Json))
            .add_source(Environment::with_prefix("UNSPLASH").try_parsing(true))
            .build()?
            .try_deserialize()
    }
}

/// Maximum number of images a user may request with one command
pub const USER_MAX_IMAGES: usize = 5;
/// Maximum `count` accepted by the Unsplash random endpoint
pub const PROVIDER_MAX_IMAGES: usize = 30;
/// Pause between consecutive image messages (flood control)
pub const DELIVERY_PACING_MS: u64 = 1400;

/// Default connect timeout for Unsplash requests
pub const UNSPLASH_CONNECT_TIMEOUT_SECS: u64 = 5;

/// Get Unsplash connect timeout from env or default.
///
/// Environment variable: `UNSPLASH_CONNECT_TIMEOUT_SECS`.
#[must_use]
pub fn get_unsplash_connect_timeout_secs() -> u64 {
    std::env::var("UNSPLASH_CONNECT_TIMEOUT_SECS")
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(UNSPLASH_CONNECT_TIMEOUT_SECS)
}

// Telegram API retry policy
/// Maximum retries for a Telegram API call
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff for Telegram API retries
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Backoff ceiling for Telegram API retries
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;
