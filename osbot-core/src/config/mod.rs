//! Configuration types for the relay.
//!
//! These are the validated values the delivery pipeline is constructed with.
//! Reading them from files or the environment is the runner's job.

mod subscriptions;

pub use subscriptions::{ChannelSubscriptions, Subscription};

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors in the subscription configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("malformed subscription entry {entry:?}: {reason}")]
    Subscription { entry: String, reason: &'static str },

    #[error("unknown event kind {kind:?} in subscription entry {entry:?}")]
    UnknownKind { entry: String, kind: String },
}

/// What to do when a configured channel cannot be fetched.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChannelResolution {
    /// Fail the whole run.
    #[default]
    Abort,
    /// Log and deliver to the remaining channels.
    Skip,
}

/// What to do when a single send fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SendFailure {
    /// Stop the run with the error.
    #[default]
    Abort,
    /// Record the failure and keep sending.
    Continue,
}

/// Pacing and failure policy of one delivery run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryConfig {
    /// Pause between the messages of consecutive events.
    pub send_delay: Duration,
    pub on_unknown_channel: ChannelResolution,
    pub on_send_failure: SendFailure,
}

impl DeliveryConfig {
    pub const DEFAULT_SEND_DELAY: Duration = Duration::from_secs(3);
}

impl Default for DeliveryConfig {
    fn default() -> Self {
        Self {
            send_delay: Self::DEFAULT_SEND_DELAY,
            on_unknown_channel: ChannelResolution::default(),
            on_send_failure: SendFailure::default(),
        }
    }
}
