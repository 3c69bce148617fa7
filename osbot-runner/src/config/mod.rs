//! Configuration module for osbot.
//!
//! Handles loading configuration from the TOML file and environment
//! variables. Environment values win over the file; a missing file is fine
//! as long as the environment supplies what is required.

pub mod file;

use crate::config::file::FileConfig;
use osbot_core::config::{ChannelSubscriptions, DeliveryConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

pub const DISCORD_TOKEN: &str = "DISCORD_TOKEN";
pub const DISCORD_EVENTS: &str = "DISCORD_EVENTS";
pub const OPENSEA_API_KEY: &str = "OPENSEA_API_KEY";
pub const OPENSEA_COLLECTION_SLUG: &str = "OPENSEA_COLLECTION_SLUG";

/// Errors that can occur during configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("invalid channel subscriptions: {0}")]
    Subscriptions(#[from] osbot_core::config::ConfigError),

    #[error("validation error: {0}")]
    ValidationError(String),
}

/// Validated configuration.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    /// Empty when no subscriptions are configured.
    pub discord_token: String,
    pub subscriptions: ChannelSubscriptions,
    pub delivery: DeliveryConfig,
    pub opensea_api_key: String,
    pub collection_slug: String,
    pub max_pages: usize,
    pub poll_interval: Duration,
    pub lookback: Duration,
}

/// Configuration loader that handles the complete loading process.
pub struct ConfigLoader {
    config_path: PathBuf,
}

impl ConfigLoader {
    /// Create a new config loader.
    pub fn new(config_path: impl AsRef<Path>) -> Self {
        Self {
            config_path: config_path.as_ref().to_path_buf(),
        }
    }

    /// Load the configuration using the process environment.
    pub fn load(&self) -> Result<LoadedConfig, ConfigError> {
        self.load_with_env(|key| std::env::var(key).ok())
    }

    /// Load the configuration, reading overrides through `env`.
    ///
    /// This will:
    /// 1. Read the TOML file, if it exists
    /// 2. Apply environment overrides
    /// 3. Parse the channel subscriptions
    /// 4. Validate the result
    pub fn load_with_env(
        &self,
        env: impl Fn(&str) -> Option<String>,
    ) -> Result<LoadedConfig, ConfigError> {
        let mut file_config = self.read_file()?;

        if let Some(token) = env(DISCORD_TOKEN) {
            file_config.discord.token = Some(token);
        }
        if let Some(events) = env(DISCORD_EVENTS) {
            file_config.discord.events = Some(events);
        }
        if let Some(api_key) = env(OPENSEA_API_KEY) {
            file_config.opensea.api_key = Some(api_key);
        }
        if let Some(slug) = env(OPENSEA_COLLECTION_SLUG) {
            file_config.opensea.collection_slug = Some(slug);
        }

        let subscriptions = ChannelSubscriptions::parse(file_config.discord.events.as_deref())?;
        self.build_loaded_config(file_config, subscriptions)
    }

    fn read_file(&self) -> Result<FileConfig, ConfigError> {
        if !self.config_path.exists() {
            tracing::debug!(
                "Config file {:?} not found, using environment only",
                self.config_path
            );
            return Ok(FileConfig::default());
        }
        let config_content = std::fs::read_to_string(&self.config_path)?;
        Ok(toml::from_str(&config_content)?)
    }

    fn build_loaded_config(
        &self,
        file_config: FileConfig,
        subscriptions: ChannelSubscriptions,
    ) -> Result<LoadedConfig, ConfigError> {
        let discord_token = non_empty(file_config.discord.token).unwrap_or_default();
        if discord_token.is_empty() && !subscriptions.is_empty() {
            return Err(ConfigError::ValidationError(format!(
                "channel subscriptions are configured but no Discord token is set ({DISCORD_TOKEN})"
            )));
        }

        let opensea_api_key = non_empty(file_config.opensea.api_key).ok_or_else(|| {
            ConfigError::ValidationError(format!("no OpenSea API key set ({OPENSEA_API_KEY})"))
        })?;
        let collection_slug = non_empty(file_config.opensea.collection_slug).ok_or_else(|| {
            ConfigError::ValidationError(format!(
                "no collection slug set ({OPENSEA_COLLECTION_SLUG})"
            ))
        })?;

        if file_config.poll.interval_secs == 0 {
            return Err(ConfigError::ValidationError(
                "poll.interval_secs must be greater than zero".to_string(),
            ));
        }

        Ok(LoadedConfig {
            discord_token,
            subscriptions,
            delivery: DeliveryConfig {
                send_delay: Duration::from_secs(file_config.discord.send_delay_secs),
                on_unknown_channel: file_config.discord.on_unknown_channel,
                on_send_failure: file_config.discord.on_send_failure,
            },
            opensea_api_key,
            collection_slug,
            max_pages: file_config.opensea.max_pages.max(1),
            poll_interval: Duration::from_secs(file_config.poll.interval_secs),
            lookback: Duration::from_secs(file_config.poll.lookback_secs),
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
