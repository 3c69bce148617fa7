//! DeliveryPipeline processor.
//!
//! The DeliveryPipeline is responsible for:
//! - Dropping events no channel subscribed to
//! - Connecting to the chat backend and resolving every configured channel
//! - Rendering the remaining events in input order
//! - Routing each message and sending it to every destination channel
//! - Pausing a fixed delay between consecutive events
//! - Disconnecting from the backend on every exit path
//!
//! Everything runs sequentially: at most one backend call is in flight.

use crate::config::{ChannelResolution, ChannelSubscriptions, DeliveryConfig, SendFailure};
use crate::events::MarketEvent;
use crate::processors::backend::{BackendError, ChannelHandle, ChatBackend};
use crate::render::{AccountNames, RenderedMessage, Renderer};
use crate::routing::channels_for;
use itertools::Itertools;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, error, info, warn};

/// Errors that abort a delivery run.
#[derive(Debug, Error)]
pub enum DeliveryError {
    /// Authentication with the chat backend failed
    #[error("failed to connect to chat backend: {0}")]
    Connect(#[source] BackendError),

    /// A configured channel could not be fetched
    #[error("failed to resolve channel {channel_id}: {source}")]
    ResolveChannel {
        channel_id: String,
        #[source]
        source: BackendError,
    },

    /// A send failed and the run is configured to stop on send failures
    #[error("failed to send {title:?} to {channel}: {source}")]
    Send {
        channel: String,
        title: String,
        #[source]
        source: BackendError,
    },
}

/// Result of sending one message to one channel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SendOutcome {
    Delivered { channel_id: String, title: String },
    Failed {
        channel_id: String,
        title: String,
        error: String,
    },
}

impl SendOutcome {
    pub fn is_delivered(&self) -> bool {
        matches!(self, SendOutcome::Delivered { .. })
    }
}

/// What one run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    /// Events left after filtering by subscribed kinds.
    pub relevant: usize,
    /// Messages rendered.
    pub rendered: usize,
    /// Rendered messages no live channel wanted.
    pub unrouted: usize,
    /// Configured channels skipped because they could not be fetched.
    pub skipped_channels: Vec<String>,
    /// Every send attempt, in order.
    pub outcomes: Vec<SendOutcome>,
}

impl DeliveryReport {
    pub fn delivered(&self) -> usize {
        self.outcomes.iter().filter(|o| o.is_delivered()).count()
    }

    pub fn failed(&self) -> usize {
        self.outcomes.len() - self.delivered()
    }
}

/// Delivers batches of market events to the subscribed chat channels.
pub struct DeliveryPipeline<B, N> {
    backend: B,
    renderer: Renderer<N>,
    subscriptions: ChannelSubscriptions,
    config: DeliveryConfig,
}

impl<B: ChatBackend, N: AccountNames> DeliveryPipeline<B, N> {
    /// Create a new DeliveryPipeline.
    ///
    /// # Arguments
    ///
    /// * `backend` - Chat backend the messages are sent through
    /// * `renderer` - Renderer for turning events into messages
    /// * `subscriptions` - Which channel wants which event kinds
    /// * `config` - Pacing and failure policy
    pub fn new(
        backend: B,
        renderer: Renderer<N>,
        subscriptions: ChannelSubscriptions,
        config: DeliveryConfig,
    ) -> Self {
        Self {
            backend,
            renderer,
            subscriptions,
            config,
        }
    }

    /// Deliver one batch.
    ///
    /// Does nothing, without touching the backend, when no channel is
    /// configured or no event matches a subscription. Once connected, the
    /// backend is disconnected exactly once whatever the outcome.
    pub async fn run(&mut self, events: Vec<MarketEvent>) -> Result<DeliveryReport, DeliveryError> {
        if self.subscriptions.is_empty() {
            debug!("No channel subscriptions configured, skipping delivery");
            return Ok(DeliveryReport::default());
        }

        let relevant: Vec<MarketEvent> = events
            .into_iter()
            .filter(|event| self.subscriptions.wants(event.kind()))
            .collect();

        info!(count = relevant.len(), "Discord - Relevant events");

        if relevant.is_empty() {
            return Ok(DeliveryReport::default());
        }

        let result = self.deliver(&relevant).await;
        self.backend.disconnect().await;

        match &result {
            Ok(report) => info!(
                delivered = report.delivered(),
                failed = report.failed(),
                unrouted = report.unrouted,
                "Discord - Delivery finished"
            ),
            Err(e) => error!("Error: {e}"),
        }

        result
    }

    async fn deliver(&mut self, events: &[MarketEvent]) -> Result<DeliveryReport, DeliveryError> {
        let mut report = DeliveryReport {
            relevant: events.len(),
            ..Default::default()
        };

        self.backend.connect().await.map_err(DeliveryError::Connect)?;

        let live_channels = self.resolve_channels(&mut report).await?;

        let mut messages = Vec::with_capacity(events.len());
        for event in events {
            messages.push(self.renderer.render(event).await);
        }
        report.rendered = messages.len();

        let mut sent_before = false;
        for (event, message) in events.iter().zip(&messages) {
            let channels = channels_for(
                event.kind(),
                event.order_type(),
                &self.subscriptions,
                &live_channels,
            );

            if channels.is_empty() {
                report.unrouted += 1;
                continue;
            }

            if sent_before {
                tokio::time::sleep(self.config.send_delay).await;
            }
            sent_before = true;

            info!(
                channels = %channels.iter().join(", "),
                title = message.title(),
                "Discord - Sending message"
            );

            for channel in channels {
                let outcome = self.send_one(channel, message).await?;
                report.outcomes.push(outcome);
            }
        }

        Ok(report)
    }

    async fn resolve_channels(
        &mut self,
        report: &mut DeliveryReport,
    ) -> Result<HashMap<String, ChannelHandle>, DeliveryError> {
        let mut live_channels = HashMap::new();

        info!("Discord - Selected channels:");
        for channel_id in self.subscriptions.channel_ids() {
            match self.backend.fetch_channel(channel_id).await {
                Ok(channel) => {
                    let kinds = self
                        .subscriptions
                        .entries()
                        .iter()
                        .filter(|entry| entry.channel_id == channel_id)
                        .join(" | ");
                    info!("Discord - * {channel}: {kinds}");
                    live_channels.insert(channel_id.to_string(), channel);
                }
                Err(source) => match self.config.on_unknown_channel {
                    ChannelResolution::Abort => {
                        return Err(DeliveryError::ResolveChannel {
                            channel_id: channel_id.to_string(),
                            source,
                        });
                    }
                    ChannelResolution::Skip => {
                        warn!(channel_id, error = %source, "Skipping unresolvable channel");
                        report.skipped_channels.push(channel_id.to_string());
                    }
                },
            }
        }

        Ok(live_channels)
    }

    async fn send_one(
        &mut self,
        channel: &ChannelHandle,
        message: &RenderedMessage,
    ) -> Result<SendOutcome, DeliveryError> {
        match self.backend.send(channel, message).await {
            Ok(()) => Ok(SendOutcome::Delivered {
                channel_id: channel.id.clone(),
                title: message.title().to_string(),
            }),
            Err(source) => match self.config.on_send_failure {
                SendFailure::Abort => Err(DeliveryError::Send {
                    channel: channel.to_string(),
                    title: message.title().to_string(),
                    source,
                }),
                SendFailure::Continue => {
                    warn!(
                        channel = %channel,
                        title = message.title(),
                        error = %source,
                        "Discord - Send failed, continuing"
                    );
                    Ok(SendOutcome::Failed {
                        channel_id: channel.id.clone(),
                        title: message.title().to_string(),
                        error: source.to_string(),
                    })
                }
            },
        }
    }
}
