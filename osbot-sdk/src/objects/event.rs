//! OpenSea v2 asset event payloads.
//!
//! These structs mirror `GET /api/v2/events/collection/{slug}`. Every field
//! except `event_type` is optional on the wire, so everything else defaults.
//!
//! A page keeps its records as raw JSON and decodes them one at a time into an
//! [`EventBatch`], so a single odd record cannot take the rest of the page
//! down with it.

use serde::{Deserialize, Deserializer, Serialize};

/// One page of `asset_events`, with the cursor for the next page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AssetEventsPage {
    #[serde(default)]
    pub asset_events: Vec<serde_json::Value>,
    #[serde(default)]
    pub next: Option<String>,
}

/// A feed record that did not decode into a [`RawEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedEvent {
    pub event_type: Option<String>,
    pub event_timestamp: Option<i64>,
    pub error: String,
}

impl RejectedEvent {
    fn new(value: &serde_json::Value, error: serde_json::Error) -> Self {
        Self {
            event_type: value
                .get("event_type")
                .and_then(|v| v.as_str())
                .map(str::to_string),
            event_timestamp: value.get("event_timestamp").and_then(|v| v.as_i64()),
            error: error.to_string(),
        }
    }
}

/// Records gathered from one or more pages.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventBatch {
    pub events: Vec<RawEvent>,
    pub rejected: Vec<RejectedEvent>,
    /// The last page pushed still had a `next` cursor.
    pub truncated: bool,
}

impl EventBatch {
    /// Decode every record of `page` and return its non-empty `next` cursor.
    pub fn push_page(&mut self, page: AssetEventsPage) -> Option<String> {
        for value in page.asset_events {
            match RawEvent::deserialize(&value) {
                Ok(event) => self.events.push(event),
                Err(e) => self.rejected.push(RejectedEvent::new(&value, e)),
            }
        }
        let next = page.next.filter(|next| !next.is_empty());
        self.truncated = next.is_some();
        next
    }

    /// Flip into oldest-first order; the API pages newest first.
    pub fn into_oldest_first(mut self) -> Self {
        self.events.reverse();
        self.rejected.reverse();
        self
    }

    /// Newest `event_timestamp` seen, rejected records included.
    pub fn newest_timestamp(&self) -> Option<i64> {
        self.events
            .iter()
            .filter_map(|event| event.event_timestamp)
            .chain(self.rejected.iter().filter_map(|r| r.event_timestamp))
            .max()
    }
}

/// A single marketplace event as delivered by the feed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawEvent {
    /// `order`, `sale`, `cancel` or `transfer`.
    pub event_type: String,
    #[serde(default)]
    pub order_type: Option<String>,
    #[serde(default)]
    pub order_hash: Option<String>,
    #[serde(default)]
    pub payment: Option<Payment>,
    #[serde(default)]
    pub from_address: Option<String>,
    #[serde(default)]
    pub to_address: Option<String>,
    #[serde(default)]
    pub asset: Option<NftRef>,
    #[serde(default)]
    pub nft: Option<NftRef>,
    #[serde(default)]
    pub expiration_date: Option<i64>,
    #[serde(default)]
    pub maker: Option<String>,
    #[serde(default)]
    pub taker: Option<String>,
    #[serde(default)]
    pub buyer: Option<String>,
    #[serde(default)]
    pub seller: Option<String>,
    #[serde(default)]
    pub criteria: Option<Criteria>,
    #[serde(default)]
    pub quantity: Option<u64>,
    #[serde(default)]
    pub transaction: Option<String>,
    #[serde(default)]
    pub event_timestamp: Option<i64>,
}

impl RawEvent {
    pub fn order_type(&self) -> &str {
        self.order_type.as_deref().unwrap_or_default()
    }
}

/// Price attached to an order or sale.
///
/// `quantity` is the raw integer amount in the token's smallest unit and can
/// exceed 64 bits, so it stays a string. Numeric quantities and null symbols
/// are accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Payment {
    #[serde(default, deserialize_with = "string_or_number")]
    pub quantity: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub decimals: u32,
    #[serde(default, deserialize_with = "null_as_default")]
    pub symbol: String,
    #[serde(default)]
    pub token_address: Option<String>,
}

/// The asset/nft object of an event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NftRef {
    #[serde(default)]
    pub identifier: Option<String>,
    #[serde(default)]
    pub collection: Option<String>,
    #[serde(default)]
    pub contract: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
    #[serde(default)]
    pub display_image_url: Option<String>,
    #[serde(default)]
    pub opensea_url: Option<String>,
}

impl NftRef {
    /// The first non-empty image URL, preferring the display variant.
    pub fn image(&self) -> Option<&str> {
        [&self.display_image_url, &self.image_url]
            .into_iter()
            .filter_map(|url| url.as_deref())
            .find(|url| !url.trim().is_empty())
    }
}

/// Trait-based filter of a criteria offer.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Criteria {
    #[serde(default, rename = "trait")]
    pub trait_criteria: Option<TraitCriteria>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TraitCriteria {
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub trait_type: String,
    /// Numeric trait values are kept in their JSON text form.
    #[serde(default, deserialize_with = "string_or_number")]
    pub value: String,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Text {
        String(String),
        Number(serde_json::Number),
        Bool(bool),
    }

    Ok(match Option::<Text>::deserialize(deserializer)? {
        Some(Text::String(s)) => s,
        Some(Text::Number(n)) => n.to_string(),
        Some(Text::Bool(b)) => b.to_string(),
        None => String::new(),
    })
}
