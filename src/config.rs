//! Configuration and settings management
//!
//! Loads settings from environment variables and defines provider constants.

use config::{Config, ConfigError, Environment, File};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;

/// Application settings loaded from environment variables
#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct Settings {
    /// Telegram Bot API token, also the secret webhook path
    pub bot_token: String,

    /// remove.bg API key
    pub removebg_api_key: Option<String>,
    /// Replicate API token
    pub replicate_api_key: Option<String>,

    /// Address the webhook server binds to
    #[serde(default = "default_listen_addr")]
    pub listen_addr: String,
    /// Port override (set by most hosting platforms)
    pub port: Option<u16>,

    /// Public base URL; when set, the webhook is registered with Telegram on startup
    pub webhook_base_url: Option<String>,

    /// remove.bg endpoint
    #[serde(default = "default_removebg_api_url")]
    pub removebg_api_url: String,
    /// Replicate API base URL
    #[serde(default = "default_replicate_api_url")]
    pub replicate_api_url: String,
}

fn default_listen_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_removebg_api_url() -> String {
    REMOVEBG_API_URL.to_string()
}

fn default_replicate_api_url() -> String {
    REPLICATE_API_URL.to_string()
}

impl Settings {
    /// Create new settings by loading from environment and files
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use photo_action_bot::config::Settings;
    ///
    /// let settings = Settings::new().expect("Failed to load configuration");
    /// ```
    ///
    /// # Errors
    ///
    /// Returns a `ConfigError` if loading fails or `BOT_TOKEN` is missing.
    pub fn new() -> Result<Self, ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = Config::builder()
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name(&format!("config/{run_mode}")).required(false))
            // Local overrides, not checked into git
            .add_source(File::with_name("config/local").required(false))
            // Eg. `APP__BOT_TOKEN=... ./target/app`
            .add_source(Environment::with_prefix("APP").separator("__"))
            // Plain UPPER_SNAKE_CASE variables map to snake_case keys; empty ones count as unset
            .add_source(Environment::default().ignore_empty(true))
            .build()?;

        let settings: Self = s.try_deserialize()?;

        if settings.bot_token.trim().is_empty() {
            return Err(ConfigError::Message("BOT_TOKEN is empty".to_string()));
        }

        Ok(settings)
    }

    /// Socket address for the webhook server, honouring `PORT` when present
    ///
    /// # Errors
    ///
    /// Returns an error if `LISTEN_ADDR` is not a valid socket address.
    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        let mut addr: SocketAddr = self.listen_addr.parse()?;
        if let Some(port) = self.port {
            addr.set_port(port);
        }
        Ok(addr)
    }

    /// remove.bg key, if configured and non-blank
    #[must_use]
    pub fn removebg_key(&self) -> Option<&str> {
        non_blank(self.removebg_api_key.as_deref())
    }

    /// Replicate token, if configured and non-blank
    #[must_use]
    pub fn replicate_key(&self) -> Option<&str> {
        non_blank(self.replicate_api_key.as_deref())
    }

    /// Full webhook URL to register with Telegram, if a public base URL is configured
    #[must_use]
    pub fn webhook_url(&self) -> Option<String> {
        non_blank(self.webhook_base_url.as_deref())
            .map(|base| format!("{}/{}", base.trim_end_matches('/'), self.bot_token))
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

// Providers

/// remove.bg background removal endpoint
pub const REMOVEBG_API_URL: &str = "https://api.remove.bg/v1.0/removebg";
/// Replicate API base URL
pub const REPLICATE_API_URL: &str = "https://api.replicate.com/v1";
/// Replicate model used for photo enhancement (`owner/name:version`)
pub const ENHANCE_MODEL: &str =
    "nightmareai/real-esrgan:42fed1c4974146d4d2414e2be2c52377c472f1072563bb1da35a8a9a5a4523af";

/// Default timeout for a single provider HTTP request
pub const PROVIDER_HTTP_TIMEOUT_SECS: u64 = 60;
/// Default interval between Replicate prediction polls
pub const REPLICATE_POLL_INTERVAL_MS: u64 = 1000;
/// Default upper bound on waiting for a Replicate prediction
pub const REPLICATE_MAX_WAIT_SECS: u64 = 120;
/// Default time Replicate may hold the create request (`Prefer: wait=N`)
pub const REPLICATE_SYNC_WAIT_SECS: u64 = 30;
/// Upper limit Replicate accepts for `Prefer: wait=N`
const REPLICATE_SYNC_WAIT_LIMIT_SECS: u64 = 60;

// Photo cache

/// Time-to-live (seconds) for cached photo references.
/// Default: 24 hours.
pub const PHOTO_CACHE_TTL_SECS: u64 = 86_400;
/// Maximum number of cached photo references.
pub const PHOTO_CACHE_MAX_SIZE: u64 = 100_000;

// Telegram API retries

/// Maximum attempts for a Telegram API operation
pub const TELEGRAM_API_MAX_RETRIES: usize = 3;
/// Initial backoff between Telegram API attempts
pub const TELEGRAM_API_INITIAL_BACKOFF_MS: u64 = 500;
/// Upper bound for backoff between Telegram API attempts
pub const TELEGRAM_API_MAX_BACKOFF_MS: u64 = 4000;

fn env_u64(name: &str, default: u64) -> u64 {
    std::env::var(name)
        .ok()
        .and_then(|s| s.parse().ok())
        .unwrap_or(default)
}

/// Get provider HTTP timeout from env or default.
///
/// Environment variable: `PROVIDER_HTTP_TIMEOUT_SECS`.
#[must_use]
pub fn get_provider_http_timeout_secs() -> u64 {
    env_u64("PROVIDER_HTTP_TIMEOUT_SECS", PROVIDER_HTTP_TIMEOUT_SECS)
}

/// Get Replicate poll interval from env or default.
///
/// Environment variable: `REPLICATE_POLL_INTERVAL_MS`.
#[must_use]
pub fn get_replicate_poll_interval_ms() -> u64 {
    env_u64("REPLICATE_POLL_INTERVAL_MS", REPLICATE_POLL_INTERVAL_MS)
}

/// Get Replicate prediction deadline from env or default.
///
/// Environment variable: `REPLICATE_MAX_WAIT_SECS`.
#[must_use]
pub fn get_replicate_max_wait_secs() -> u64 {
    env_u64("REPLICATE_MAX_WAIT_SECS", REPLICATE_MAX_WAIT_SECS)
}

/// Get the Replicate sync wait from env or default.
///
/// Clamped to half of `http_timeout_secs` so a held create request always
/// answers before the HTTP client gives up. Environment variable:
/// `REPLICATE_SYNC_WAIT_SECS`.
#[must_use]
pub fn get_replicate_sync_wait_secs(http_timeout_secs: u64) -> u64 {
    env_u64("REPLICATE_SYNC_WAIT_SECS", REPLICATE_SYNC_WAIT_SECS)
        .min(http_timeout_secs / 2)
        .min(REPLICATE_SYNC_WAIT_LIMIT_SECS)
}

/// Get photo cache TTL from env or default.
///
/// Environment variable: `PHOTO_CACHE_TTL_SECS`.
#[must_use]
pub fn get_photo_cache_ttl() -> u64 {
    env_u64("PHOTO_CACHE_TTL_SECS", PHOTO_CACHE_TTL_SECS)
}

/// Get photo cache capacity from env or default.
///
/// Environment variable: `PHOTO_CACHE_MAX_SIZE`.
#[must_use]
pub fn get_photo_cache_max_size() -> u64 {
    env_u64("PHOTO_CACHE_MAX_SIZE", PHOTO_CACHE_MAX_SIZE)
}
