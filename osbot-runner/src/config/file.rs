//! TOML file configuration structures.
//!
//! These structs directly map to the `osbot.toml` file format. Every section
//! and every key is optional; anything missing can come from the environment.

use osbot_core::config::{ChannelResolution, SendFailure};
use serde::{Deserialize, Serialize};

/// Root configuration structure as read from the TOML file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FileConfig {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub opensea: OpenSeaConfig,
    #[serde(default)]
    pub poll: PollConfig,
}

/// Discord configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscordConfig {
    /// Bot token. Overridden by `DISCORD_TOKEN`.
    pub token: Option<String>,
    /// Channel subscriptions, `channelId=kind,kind&channelId=kind`.
    /// Overridden by `DISCORD_EVENTS`.
    pub events: Option<String>,
    /// Seconds between the messages of consecutive events.
    #[serde(default = "default_send_delay_secs")]
    pub send_delay_secs: u64,
    #[serde(default)]
    pub on_unknown_channel: ChannelResolution,
    #[serde(default)]
    pub on_send_failure: SendFailure,
}

impl Default for DiscordConfig {
    fn default() -> Self {
        Self {
            token: None,
            events: None,
            send_delay_secs: default_send_delay_secs(),
            on_unknown_channel: ChannelResolution::default(),
            on_send_failure: SendFailure::default(),
        }
    }
}

fn default_send_delay_secs() -> u64 {
    3
}

/// OpenSea configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenSeaConfig {
    /// API key. Overridden by `OPENSEA_API_KEY`.
    pub api_key: Option<String>,
    /// Collection to follow. Overridden by `OPENSEA_COLLECTION_SLUG`.
    pub collection_slug: Option<String>,
    /// Upper bound on event pages fetched per poll.
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,
}

impl Default for OpenSeaConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            collection_slug: None,
            max_pages: default_max_pages(),
        }
    }
}

fn default_max_pages() -> usize {
    4
}

/// Poll loop configuration section.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PollConfig {
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// How far back the first poll reaches.
    #[serde(default = "default_interval_secs")]
    pub lookback_secs: u64,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_interval_secs(),
            lookback_secs: default_interval_secs(),
        }
    }
}

fn default_interval_secs() -> u64 {
    60
}
