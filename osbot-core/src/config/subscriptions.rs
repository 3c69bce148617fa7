//! Channel subscription table.
//!
//! Parsed from a single string of the form
//! `channelId=kind1,kind2&channelId=kind3`, e.g.
//! `123=listing,sale&456=offer,transfer`.

use super::ConfigError;
use crate::events::EventKind;
use itertools::Itertools;
use smallvec::SmallVec;
use std::fmt;

/// One `channelId=kinds` entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Subscription {
    pub channel_id: String,
    /// Subscribed kinds in configuration order, `order` appended when the
    /// entry asks for listings or offers.
    pub kinds: SmallVec<[EventKind; 4]>,
}

impl Subscription {
    pub fn wants(&self, kind: EventKind) -> bool {
        self.kinds.contains(&kind)
    }
}

impl fmt::Display for Subscription {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kinds.iter().join(", "))
    }
}

/// Ordered mapping from channel to the kinds it wants.
///
/// An empty table disables delivery entirely.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChannelSubscriptions {
    entries: Vec<Subscription>,
}

impl ChannelSubscriptions {
    /// Parse the subscription string.
    ///
    /// `None`, an empty or an all-whitespace string gives an empty table.
    /// Malformed entries are rejected with the offending entry in the error.
    pub fn parse(config: Option<&str>) -> Result<Self, ConfigError> {
        let Some(config) = config.map(str::trim).filter(|c| !c.is_empty()) else {
            return Ok(Self::default());
        };

        let entries = config
            .split('&')
            .map(str::trim)
            .filter(|entry| !entry.is_empty())
            .map(parse_entry)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[Subscription] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Union of all subscribed kinds, in first-seen order.
    pub fn all_kinds(&self) -> Vec<EventKind> {
        self.entries
            .iter()
            .flat_map(|entry| entry.kinds.iter().copied())
            .unique()
            .collect()
    }

    /// Subscribed kinds the feed actually emits.
    pub fn wire_kinds(&self) -> Vec<EventKind> {
        self.all_kinds()
            .into_iter()
            .filter(EventKind::is_wire_kind)
            .collect()
    }

    /// Whether any channel subscribed to `kind`.
    pub fn wants(&self, kind: EventKind) -> bool {
        self.entries.iter().any(|entry| entry.wants(kind))
    }

    /// Distinct channel ids in table order.
    pub fn channel_ids(&self) -> Vec<&str> {
        self.entries
            .iter()
            .map(|entry| entry.channel_id.as_str())
            .unique()
            .collect()
    }
}

fn parse_entry(entry: &str) -> Result<Subscription, ConfigError> {
    let malformed = |reason: &'static str| ConfigError::Subscription {
        entry: entry.to_string(),
        reason,
    };

    let Some((channel_id, kinds)) = entry.split_once('=') else {
        return Err(malformed("expected channelId=kind[,kind...]"));
    };

    let channel_id = channel_id.trim();
    if channel_id.is_empty() {
        return Err(malformed("empty channel id"));
    }

    let mut parsed: SmallVec<[EventKind; 4]> = SmallVec::new();
    for kind in kinds.split(',').map(str::trim).filter(|k| !k.is_empty()) {
        let kind = kind
            .parse::<EventKind>()
            .map_err(|e| ConfigError::UnknownKind {
                entry: entry.to_string(),
                kind: e.0,
            })?;
        if !parsed.contains(&kind) {
            parsed.push(kind);
        }
    }

    if parsed.is_empty() {
        return Err(malformed("empty kind list"));
    }

    // The feed reports listings and offers as plain `order` events.
    let wants_orders = parsed.contains(&EventKind::Listing) || parsed.contains(&EventKind::Offer);
    if wants_orders && !parsed.contains(&EventKind::Order) {
        parsed.push(EventKind::Order);
    }

    Ok(Subscription {
        channel_id: channel_id.to_string(),
        kinds: parsed,
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use EventKind::*;

    #[test]
    fn test_listing_and_offer_imply_order() {
        let subs =
            ChannelSubscriptions::parse(Some("123=listing,sale&456=offer,transfer")).unwrap();
        let entries = subs.entries();

        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].channel_id, "123");
        assert_eq!(entries[0].kinds.as_slice(), &[Listing, Sale, Order]);
        assert_eq!(entries[1].channel_id, "456");
        assert_eq!(entries[1].kinds.as_slice(), &[Offer, Transfer, Order]);
    }

    #[test]
    fn test_order_not_duplicated() {
        let subs = ChannelSubscriptions::parse(Some("1=order,listing,offer")).unwrap();
        assert_eq!(subs.entries()[0].kinds.as_slice(), &[Order, Listing, Offer]);
    }

    #[test]
    fn test_sale_only_channel_has_no_order() {
        let subs = ChannelSubscriptions::parse(Some("1=sale,cancel")).unwrap();
        assert!(!subs.entries()[0].wants(Order));
        assert!(!subs.wants(Order));
        assert!(subs.wants(Cancel));
    }

    #[test]
    fn test_absent_or_blank_config_is_empty() {
        assert!(ChannelSubscriptions::parse(None).unwrap().is_empty());
        assert!(ChannelSubscriptions::parse(Some("")).unwrap().is_empty());
        assert!(ChannelSubscriptions::parse(Some("   ")).unwrap().is_empty());
    }

    #[test]
    fn test_whitespace_and_trailing_separator_tolerated() {
        let subs = ChannelSubscriptions::parse(Some(" 1 = sale , transfer &")).unwrap();
        assert_eq!(subs.entries().len(), 1);
        assert_eq!(subs.entries()[0].channel_id, "1");
        assert_eq!(subs.entries()[0].kinds.as_slice(), &[Sale, Transfer]);
    }

    #[test]
    fn test_malformed_entries_rejected() {
        let err = ChannelSubscriptions::parse(Some("123=sale&456")).unwrap_err();
        assert!(
            matches!(&err, ConfigError::Subscription { entry, .. } if entry == "456"),
            "{err}"
        );

        let err = ChannelSubscriptions::parse(Some("=sale")).unwrap_err();
        assert!(matches!(err, ConfigError::Subscription { reason: "empty channel id", .. }));

        let err = ChannelSubscriptions::parse(Some("123=")).unwrap_err();
        assert!(matches!(err, ConfigError::Subscription { reason: "empty kind list", .. }));

        let err = ChannelSubscriptions::parse(Some("123=sale,mint")).unwrap_err();
        assert!(
            matches!(&err, ConfigError::UnknownKind { kind, .. } if kind == "mint"),
            "{err}"
        );
    }

    #[test]
    fn test_union_and_channel_ids() {
        let subs =
            ChannelSubscriptions::parse(Some("1=listing&2=sale,listing&1=transfer")).unwrap();
        assert_eq!(subs.all_kinds(), vec![Listing, Order, Sale, Transfer]);
        assert_eq!(subs.wire_kinds(), vec![Order, Sale, Transfer]);
        assert_eq!(subs.channel_ids(), vec!["1", "2"]);
        assert_eq!(subs.entries()[1].to_string(), "sale, listing, order");
    }
}
