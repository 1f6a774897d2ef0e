//! Application configuration loaded from environment variables.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Telegram Bot API configuration
    pub telegram: TelegramConfig,

    /// LTA DataMall configuration
    pub datamall: DatamallConfig,

    /// Bus stop directory
    #[serde(default)]
    pub bus_stops: BusStopsConfig,

    /// Bot behaviour
    #[serde(default)]
    pub bot: BotConfig,

    /// Webhook server, used when `bot.mode` is `webhook`
    #[serde(default)]
    pub webhook: WebhookConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TelegramConfig {
    /// Bot token from @BotFather
    pub token: String,

    /// Bot API base URL
    #[serde(default = "default_telegram_url")]
    pub api_url: String,

    /// Request timeout for regular API calls
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Server-side wait for long polling
    #[serde(default = "default_poll_timeout", with = "humantime_serde")]
    pub poll_timeout: Duration,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatamallConfig {
    /// DataMall account key
    pub account_key: String,

    /// API base URL
    #[serde(default = "default_datamall_url")]
    pub base_url: String,

    /// Request timeout
    #[serde(default = "default_timeout", with = "humantime_serde")]
    pub timeout: Duration,

    /// Retries for failed arrival lookups
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BusStopsConfig {
    /// JSON file of DataMall bus stop records
    #[serde(default = "default_bus_stops_path")]
    pub path: PathBuf,
}

/// How updates reach the bot.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Polling,
    Webhook,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    #[serde(default)]
    pub mode: Mode,

    /// Log level
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Search radius for location messages and inline queries, in metres
    #[serde(default = "default_nearby_radius")]
    pub nearby_radius: f64,

    /// Maximum stops listed for a location
    #[serde(default = "default_nearby_limit")]
    pub nearby_limit: usize,

    /// Cache time in seconds for inline query answers
    #[serde(default = "default_inline_cache_time")]
    pub inline_cache_time: u32,

    /// Where `/feedback` points users
    #[serde(default)]
    pub feedback_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookConfig {
    #[serde(default = "default_listen_addr")]
    pub listen_addr: IpAddr,

    #[serde(default = "default_port")]
    pub port: u16,

    /// Path Telegram posts updates to. Treat it as a secret.
    #[serde(default = "default_webhook_path")]
    pub path: String,
}

// Default implementations
impl Default for BusStopsConfig {
    fn default() -> Self {
        Self {
            path: default_bus_stops_path(),
        }
    }
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            mode: Mode::default(),
            log_level: default_log_level(),
            nearby_radius: default_nearby_radius(),
            nearby_limit: default_nearby_limit(),
            inline_cache_time: default_inline_cache_time(),
            feedback_url: None,
        }
    }
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_listen_addr(),
            port: default_port(),
            path: default_webhook_path(),
        }
    }
}

// Default value functions
fn default_telegram_url() -> String {
    telegram_client::DEFAULT_API_URL.into()
}

fn default_datamall_url() -> String {
    datamall_client::DEFAULT_BASE_URL.into()
}

fn default_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_poll_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_max_retries() -> u32 {
    datamall_client::DEFAULT_MAX_RETRIES
}

fn default_bus_stops_path() -> PathBuf {
    PathBuf::from("data/bus-stops.json")
}

fn default_log_level() -> String {
    "info".into()
}

fn default_nearby_radius() -> f64 {
    500.0
}

fn default_nearby_limit() -> usize {
    5
}

fn default_inline_cache_time() -> u32 {
    86400
}

fn default_listen_addr() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    8080
}

fn default_webhook_path() -> String {
    "/telegram/update".into()
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self> {
        // Load .env file if present
        dotenvy::dotenv().ok();

        Self::from_environment(config::Environment::default())
    }

    fn from_environment(environment: config::Environment) -> Result<Self> {
        let config = config::Config::builder()
            .add_source(
                environment
                    .separator("__")
                    // Keep tokens and account keys as strings.
                    .try_parsing(false),
            )
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn load(vars: &[(&str, &str)]) -> Result<Config> {
        let source: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Config::from_environment(config::Environment::default().source(Some(source)))
    }

    #[test]
    fn test_defaults() {
        let config = load(&[
            ("TELEGRAM__TOKEN", "123:abc"),
            ("DATAMALL__ACCOUNT_KEY", "key"),
        ])
        .unwrap();

        assert_eq!(config.telegram.token, "123:abc");
        assert_eq!(config.telegram.api_url, "https://api.telegram.org");
        assert_eq!(config.telegram.poll_timeout, Duration::from_secs(30));
        assert_eq!(config.datamall.max_retries, 3);
        assert_eq!(config.bot.mode, Mode::Polling);
        assert_eq!(config.bot.nearby_radius, 500.0);
        assert_eq!(config.bot.inline_cache_time, 86400);
        assert_eq!(config.bot.feedback_url, None);
        assert_eq!(config.webhook.port, 8080);
    }

    #[test]
    fn test_overrides() {
        let config = load(&[
            ("TELEGRAM__TOKEN", "123:abc"),
            ("TELEGRAM__TIMEOUT", "5s"),
            ("DATAMALL__ACCOUNT_KEY", "key"),
            ("DATAMALL__MAX_RETRIES", "0"),
            ("BUS_STOPS__PATH", "/srv/stops.json"),
            ("BOT__MODE", "webhook"),
            ("BOT__NEARBY_RADIUS", "250"),
            ("BOT__FEEDBACK_URL", "https://example.com/feedback"),
            ("WEBHOOK__PORT", "9000"),
            ("WEBHOOK__PATH", "/hook/secret"),
        ])
        .unwrap();

        assert_eq!(config.telegram.timeout, Duration::from_secs(5));
        assert_eq!(config.datamall.max_retries, 0);
        assert_eq!(config.bus_stops.path, PathBuf::from("/srv/stops.json"));
        assert_eq!(config.bot.mode, Mode::Webhook);
        assert_eq!(config.bot.nearby_radius, 250.0);
        assert_eq!(
            config.bot.feedback_url.as_deref(),
            Some("https://example.com/feedback")
        );
        assert_eq!(config.webhook.port, 9000);
        assert_eq!(config.webhook.path, "/hook/secret");
    }

    #[test]
    fn test_missing_token_fails() {
        assert!(load(&[("DATAMALL__ACCOUNT_KEY", "key")]).is_err());
    }
}
