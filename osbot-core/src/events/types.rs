//! Typed marketplace events.
//!
//! The feed delivers loosely shaped records (`RawEvent`). Before anything is
//! filtered or rendered they are converted into [`MarketEvent`], which carries
//! only the fields that make sense for each kind.

use osbot_sdk::objects::{NftRef, Payment, RawEvent, TraitCriteria};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Kinds a channel can subscribe to.
///
/// `Order`, `Sale`, `Cancel` and `Transfer` are the kinds the feed emits.
/// `Listing` and `Offer` only exist on the subscription side: the feed emits
/// both as `order` and they are told apart by the order subtype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    Order,
    Listing,
    Offer,
    Sale,
    Cancel,
    Transfer,
}

impl EventKind {
    pub const ALL: [EventKind; 6] = [
        EventKind::Order,
        EventKind::Listing,
        EventKind::Offer,
        EventKind::Sale,
        EventKind::Cancel,
        EventKind::Transfer,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Order => "order",
            EventKind::Listing => "listing",
            EventKind::Offer => "offer",
            EventKind::Sale => "sale",
            EventKind::Cancel => "cancel",
            EventKind::Transfer => "transfer",
        }
    }

    /// Whether the feed emits this kind on the wire.
    pub fn is_wire_kind(&self) -> bool {
        !matches!(self, EventKind::Listing | EventKind::Offer)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown event kind: {0:?}")]
pub struct UnknownEventKind(pub String);

impl FromStr for EventKind {
    type Err = UnknownEventKind;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.as_str() == s)
            .ok_or_else(|| UnknownEventKind(s.to_string()))
    }
}

/// Errors converting a feed record into a [`MarketEvent`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EventError {
    #[error(transparent)]
    UnknownKind(#[from] UnknownEventKind),

    /// `listing` and `offer` are subscription kinds, never wire kinds.
    #[error("{0} is not an event kind emitted by the feed")]
    NotAWireKind(EventKind),
}

/// An open order: listing, offer, auction, trait offer, ...
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderEvent {
    /// Free-form subtype, e.g. `listing`, `item_offer`, `auction`, `trait_offer`.
    pub order_type: String,
    pub payment: Option<Payment>,
    pub expiration_date: Option<i64>,
    pub maker: Option<String>,
    pub criteria: Option<TraitCriteria>,
    pub nft: Option<NftRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaleEvent {
    pub payment: Option<Payment>,
    pub buyer: Option<String>,
    pub seller: Option<String>,
    pub nft: Option<NftRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CancelEvent {
    pub payment: Option<Payment>,
    pub maker: Option<String>,
    pub nft: Option<NftRef>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferEvent {
    pub from_address: Option<String>,
    pub to_address: Option<String>,
    pub nft: Option<NftRef>,
}

/// A marketplace occurrence, one variant per wire kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarketEvent {
    Order(OrderEvent),
    Sale(SaleEvent),
    Cancel(CancelEvent),
    Transfer(TransferEvent),
}

impl MarketEvent {
    /// The wire kind of this event.
    pub fn kind(&self) -> EventKind {
        match self {
            MarketEvent::Order(_) => EventKind::Order,
            MarketEvent::Sale(_) => EventKind::Sale,
            MarketEvent::Cancel(_) => EventKind::Cancel,
            MarketEvent::Transfer(_) => EventKind::Transfer,
        }
    }

    /// The order subtype, empty for anything but orders.
    pub fn order_type(&self) -> &str {
        match self {
            MarketEvent::Order(order) => &order.order_type,
            _ => "",
        }
    }

    /// The NFT to display, if the feed attached one.
    pub fn nft(&self) -> Option<&NftRef> {
        match self {
            MarketEvent::Order(e) => e.nft.as_ref(),
            MarketEvent::Sale(e) => e.nft.as_ref(),
            MarketEvent::Cancel(e) => e.nft.as_ref(),
            MarketEvent::Transfer(e) => e.nft.as_ref(),
        }
    }
}

impl TryFrom<RawEvent> for MarketEvent {
    type Error = EventError;

    fn try_from(raw: RawEvent) -> Result<Self, Self::Error> {
        let kind: EventKind = raw.event_type.parse()?;
        let nft = raw.nft.or(raw.asset);

        let event = match kind {
            EventKind::Order => MarketEvent::Order(OrderEvent {
                order_type: raw.order_type.unwrap_or_default(),
                payment: raw.payment,
                expiration_date: raw.expiration_date,
                maker: raw.maker,
                criteria: raw.criteria.and_then(|c| c.trait_criteria),
                nft,
            }),
            EventKind::Sale => MarketEvent::Sale(SaleEvent {
                payment: raw.payment,
                buyer: raw.buyer.or(raw.taker),
                seller: raw.seller.or(raw.maker),
                nft,
            }),
            EventKind::Cancel => MarketEvent::Cancel(CancelEvent {
                payment: raw.payment,
                maker: raw.maker,
                nft,
            }),
            EventKind::Transfer => MarketEvent::Transfer(TransferEvent {
                from_address: raw.from_address,
                to_address: raw.to_address,
                nft,
            }),
            EventKind::Listing | EventKind::Offer => return Err(EventError::NotAWireKind(kind)),
        };

        Ok(event)
    }
}
