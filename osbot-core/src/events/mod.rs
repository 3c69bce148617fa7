//! Marketplace event types.
//!
//! # Event Flow
//!
//! 1. The feed delivers `RawEvent` records (see `osbot_sdk::objects`)
//! 2. Each record is converted into a [`MarketEvent`]; unknown kinds are dropped
//! 3. The delivery pipeline filters, renders, routes and sends them
//!
//! Events are ephemeral: nothing here outlives a single delivery run.

pub mod types;

pub use types::{
    CancelEvent, EventError, EventKind, MarketEvent, OrderEvent, SaleEvent, TransferEvent,
    UnknownEventKind,
};

use osbot_sdk::objects::RawEvent;
use tracing::warn;

/// Convert a feed batch, dropping records that do not map to a known event.
///
/// Order is preserved.
pub fn from_feed(raw_events: impl IntoIterator<Item = RawEvent>) -> Vec<MarketEvent> {
    raw_events
        .into_iter()
        .filter_map(|raw| {
            let event_type = raw.event_type.clone();
            match MarketEvent::try_from(raw) {
                Ok(event) => Some(event),
                Err(e) => {
                    warn!(event_type = %event_type, error = %e, "Skipping feed event");
                    None
                }
            }
        })
        .collect()
}
