//! Discord REST response objects.

use serde::{Deserialize, Serialize};

/// The subset of a Discord channel object the relay needs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordChannel {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
}

/// `GET /users/@me`, used to validate the bot token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordUser {
    pub id: String,
    pub username: String,
}
