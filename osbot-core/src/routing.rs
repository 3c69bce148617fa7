//! Event to channel routing.

use crate::config::ChannelSubscriptions;
use crate::events::EventKind;
use crate::processors::ChannelHandle;
use std::collections::HashMap;

/// Resolve the generic `order` kind into `listing` or `offer`.
///
/// Any subtype containing "offer" (`offer`, `item_offer`, `trait_offer`,
/// `collection_offer`, ...) is an offer, everything else a listing. Other
/// kinds pass through unchanged.
pub fn effective_kind(kind: EventKind, order_type: &str) -> EventKind {
    match kind {
        EventKind::Order if order_type.contains("offer") => EventKind::Offer,
        EventKind::Order => EventKind::Listing,
        other => other,
    }
}

/// Live channels that should receive an event of this kind and subtype.
///
/// Follows subscription-table order. Channels that were not resolved are
/// left out, and a channel listed by several matching entries appears once.
pub fn channels_for<'a>(
    kind: EventKind,
    order_type: &str,
    subscriptions: &ChannelSubscriptions,
    live_channels: &'a HashMap<String, ChannelHandle>,
) -> Vec<&'a ChannelHandle> {
    let kind = effective_kind(kind, order_type);

    let mut channels: Vec<&ChannelHandle> = Vec::new();
    for entry in subscriptions.entries() {
        if !entry.wants(kind) {
            continue;
        }
        let Some(channel) = live_channels.get(&entry.channel_id) else {
            continue;
        };
        if !channels.iter().any(|c| c.id == channel.id) {
            channels.push(channel);
        }
    }
    channels
}
