//! Application configuration structures.
//!
//! Tunables live in an optional TOML file; credentials and endpoints come
//! from the environment and are never read from the file.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::{AppError, Result};

/// Environment variable holding the catalog API base URL.
pub const ENV_CATALOG_URL: &str = "MANGA_API";
/// Environment variable holding the bot token.
pub const ENV_BOT_TOKEN: &str = "BOT_TOKEN";
/// Environment variable holding the channel name (without `@`).
pub const ENV_CHAT_ID: &str = "CHAT_ID";
/// Environment variable holding the image host base URL.
pub const ENV_IMAGE_URL: &str = "IMAGE_API";

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Catalog API request settings
    #[serde(default)]
    pub catalog: CatalogConfig,

    /// Bot API settings
    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Cover image settings
    #[serde(default)]
    pub images: ImageConfig,

    /// Public site used for "read now" links
    #[serde(default)]
    pub site: SiteConfig,

    /// Startup and daily trigger settings
    #[serde(default)]
    pub schedule: ScheduleConfig,

    /// Sent-title ledger settings
    #[serde(default)]
    pub ledger: LedgerConfig,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Fill credentials and endpoints from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Fill credentials and endpoints using the given variable lookup.
    ///
    /// Empty values count as missing. Every missing required variable is
    /// named in the returned error.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let catalog_url = read(ENV_CATALOG_URL);
        let bot_token = read(ENV_BOT_TOKEN);
        let chat_id = read(ENV_CHAT_ID);

        let missing: Vec<&str> = [
            (ENV_CATALOG_URL, catalog_url.is_none()),
            (ENV_CHAT_ID, chat_id.is_none()),
            (ENV_BOT_TOKEN, bot_token.is_none()),
        ]
        .into_iter()
        .filter_map(|(key, absent)| absent.then_some(key))
        .collect();

        if !missing.is_empty() {
            return Err(AppError::config(format!(
                "Missing required environment variables: {}",
                missing.join(", ")
            )));
        }

        self.catalog.url = catalog_url.unwrap_or_default();
        self.telegram.bot_token = bot_token.unwrap_or_default();
        self.telegram.chat_id = chat_id.unwrap_or_default();
        self.images.base_url = read(ENV_IMAGE_URL);
        Ok(())
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        Url::parse(&self.catalog.url)?;
        Url::parse(&self.telegram.api_base)?;
        Url::parse(&self.site.comic_base_url)?;
        if let Some(base) = &self.images.base_url {
            Url::parse(base)?;
        }

        if self.catalog.user_agent.trim().is_empty() {
            return Err(AppError::validation("catalog.user_agent is empty"));
        }
        if self.catalog.timeout_secs == 0 {
            return Err(AppError::validation("catalog.timeout_secs must be > 0"));
        }
        if self.images.probe_timeout_secs == 0 {
            return Err(AppError::validation(
                "images.probe_timeout_secs must be > 0",
            ));
        }
        if self.schedule.hour > 23 {
            return Err(AppError::validation("schedule.hour must be in 0..=23"));
        }
        if self.schedule.minute > 59 {
            return Err(AppError::validation("schedule.minute must be in 0..=59"));
        }
        if self.ledger.path.as_os_str().is_empty() {
            return Err(AppError::validation("ledger.path is empty"));
        }
        Ok(())
    }
}

/// Catalog API request settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    /// Base URL of the listing endpoint (from `MANGA_API`)
    #[serde(skip)]
    pub url: String,

    /// Page size
    #[serde(default = "defaults::limit")]
    pub limit: u32,

    /// Country code filter
    #[serde(default = "defaults::country")]
    pub country: String,

    /// Publication status filter
    #[serde(default = "defaults::status")]
    pub status: u32,

    /// Recency filter in days
    #[serde(default = "defaults::time")]
    pub time: u32,

    /// Page number
    #[serde(default = "defaults::page")]
    pub page: u32,

    /// User-Agent header for catalog requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Optional Referer header
    #[serde(default)]
    pub referer: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,
}

impl CatalogConfig {
    /// Query parameters sent with every catalog request.
    pub fn query(&self) -> Vec<(&'static str, String)> {
        vec![
            ("limit", self.limit.to_string()),
            ("country", self.country.clone()),
            ("status", self.status.to_string()),
            ("time", self.time.to_string()),
            ("page", self.page.to_string()),
        ]
    }
}

impl Default for CatalogConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            limit: defaults::limit(),
            country: defaults::country(),
            status: defaults::status(),
            time: defaults::time(),
            page: defaults::page(),
            user_agent: defaults::user_agent(),
            referer: None,
            timeout_secs: defaults::timeout(),
        }
    }
}

/// Bot API settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    /// Bot API root, without the token path
    #[serde(default = "defaults::api_base")]
    pub api_base: String,

    /// Bot token (from `BOT_TOKEN`)
    #[serde(skip)]
    pub bot_token: String,

    /// Channel name without the leading `@` (from `CHAT_ID`)
    #[serde(skip)]
    pub chat_id: String,

    /// Markdown dialect for captions
    #[serde(default = "defaults::parse_mode")]
    pub parse_mode: String,

    /// Label of the inline link button
    #[serde(default = "defaults::button_text")]
    pub button_text: String,
}

impl TelegramConfig {
    /// Chat target as the bot API expects it.
    pub fn chat_target(&self) -> String {
        format!("@{}", self.chat_id)
    }

    /// Endpoint URL for a bot method such as `sendPhoto`.
    pub fn method_url(&self, method: &str) -> String {
        format!(
            "{}/bot{}/{}",
            self.api_base.trim_end_matches('/'),
            self.bot_token,
            method
        )
    }
}

impl Default for TelegramConfig {
    fn default() -> Self {
        Self {
            api_base: defaults::api_base(),
            bot_token: String::new(),
            chat_id: String::new(),
            parse_mode: defaults::parse_mode(),
            button_text: defaults::button_text(),
        }
    }
}

/// Cover image settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImageConfig {
    /// Image host base URL (from `IMAGE_API`)
    #[serde(skip)]
    pub base_url: Option<String>,

    /// HEAD probe timeout in seconds
    #[serde(default = "defaults::probe_timeout")]
    pub probe_timeout_secs: u64,
}

impl Default for ImageConfig {
    fn default() -> Self {
        Self {
            base_url: None,
            probe_timeout_secs: defaults::probe_timeout(),
        }
    }
}

/// Public site settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SiteConfig {
    /// Prefix for canonical title links (`{comic_base_url}/{slug}`)
    #[serde(default = "defaults::comic_base_url")]
    pub comic_base_url: String,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            comic_base_url: defaults::comic_base_url(),
        }
    }
}

/// Startup and daily trigger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    /// Local hour of the daily run
    #[serde(default = "defaults::hour")]
    pub hour: u32,

    /// Local minute of the daily run
    #[serde(default = "defaults::minute")]
    pub minute: u32,

    /// Pause before the startup run, in seconds
    #[serde(default = "defaults::warmup")]
    pub warmup_secs: u64,

    /// Pause after every catalog entry, in seconds
    #[serde(default = "defaults::post_delay")]
    pub post_delay_secs: u64,

    /// Run one cycle immediately at startup
    #[serde(default = "defaults::run_on_startup")]
    pub run_on_startup: bool,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            hour: defaults::hour(),
            minute: defaults::minute(),
            warmup_secs: defaults::warmup(),
            post_delay_secs: defaults::post_delay(),
            run_on_startup: defaults::run_on_startup(),
        }
    }
}

/// Sent-title ledger settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Path of the JSON array of announced titles
    #[serde(default = "defaults::ledger_path")]
    pub path: PathBuf,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            path: defaults::ledger_path(),
        }
    }
}

mod defaults {
    use std::path::PathBuf;

    // Catalog defaults
    pub fn limit() -> u32 {
        10
    }
    pub fn country() -> String {
        "kr".into()
    }
    pub fn status() -> u32 {
        1
    }
    pub fn time() -> u32 {
        10
    }
    pub fn page() -> u32 {
        1
    }
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/90.0.4430.93 Safari/537.36".into()
    }
    pub fn timeout() -> u64 {
        30
    }

    // Telegram defaults
    pub fn api_base() -> String {
        "https://api.telegram.org".into()
    }
    pub fn parse_mode() -> String {
        "MarkdownV2".into()
    }
    pub fn button_text() -> String {
        "🔗 READ NOW".into()
    }

    // Image defaults
    pub fn probe_timeout() -> u64 {
        5
    }

    pub fn comic_base_url() -> String {
        "https://comick.io/comic".into()
    }

    // Schedule defaults
    pub fn hour() -> u32 {
        18
    }
    pub fn minute() -> u32 {
        30
    }
    pub fn warmup() -> u64 {
        10
    }
    pub fn post_delay() -> u64 {
        15
    }
    pub fn run_on_startup() -> bool {
        true
    }

    pub fn ledger_path() -> PathBuf {
        PathBuf::from("titles.json")
    }
}
