//! Event to message rendering.
//!
//! Every event becomes one [`RenderedMessage`]: a title, an accent color, a
//! row of inline fields and, when the event names an NFT, a link and an image.
//!
//! | kind / subtype            | title prefix                     | fields                     |
//! |---------------------------|----------------------------------|----------------------------|
//! | order `auction`           | `Auction:`                       | Starting Price, Ends, By   |
//! | order `trait_offer`       | `Trait offer: {type} -> {value}` | Price, Expires, By         |
//! | order `collection_offer`  | `Collection offer:`              | Price, Expires, By         |
//! | order, other `*offer*`    | `Offer:`                         | Price, Expires, By         |
//! | order, anything else      | `Listed for sale:`               | Price, Expires, By         |
//! | sale                      | `Purchased:`                     | Price, By                  |
//! | cancel                    | `Order canceled:`                | Price, By                  |
//! | transfer                  | `Transferred:` / `Minted:`       | From, To                   |
//!
//! A field whose source value is missing is left out. The sale `By` is the
//! buyer, or the seller when no buyer is known.

pub mod format;
pub mod names;

pub use format::{format_amount, format_relative};
pub use names::{AccountNames, ShortAddresses, short_address};

use crate::events::{CancelEvent, EventKind, MarketEvent, OrderEvent, SaleEvent, TransferEvent};
use osbot_sdk::objects::{Embed, EmbedField, EmbedImage, Payment};
use time::OffsetDateTime;

/// Accent colors, 24-bit RGB.
pub mod colors {
    pub const OFFER: u32 = 0xD63864;
    pub const LISTING: u32 = 0x66DCF0;
    pub const SALE: u32 = 0x62B778;
    pub const CANCEL: u32 = 0x9537B0;
    pub const TRANSFER: u32 = 0x5296D5;
    pub const FALLBACK: u32 = 0x9537B0;
}

/// Accent color for a wire kind and order subtype.
///
/// Accepts raw kind strings so that kinds the relay does not know about
/// still get a color.
pub fn color_for(kind: &str, order_type: &str) -> u32 {
    match kind.parse::<EventKind>() {
        Ok(EventKind::Order) if order_type.contains("offer") => colors::OFFER,
        Ok(EventKind::Order) => colors::LISTING,
        Ok(EventKind::Sale) => colors::SALE,
        Ok(EventKind::Cancel) => colors::CANCEL,
        Ok(EventKind::Transfer) => colors::TRANSFER,
        Ok(EventKind::Listing | EventKind::Offer) | Err(_) => colors::FALLBACK,
    }
}

/// One inline field of a message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageField {
    pub name: String,
    pub value: String,
}

/// A fully formatted message, ready to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMessage {
    title: String,
    color: u32,
    fields: Vec<MessageField>,
    url: Option<String>,
    image: Option<String>,
}

impl RenderedMessage {
    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn color(&self) -> u32 {
        self.color
    }

    pub fn fields(&self) -> &[MessageField] {
        &self.fields
    }

    /// Value of the first field called `name`.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|f| f.name == name)
            .map(|f| f.value.as_str())
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    /// The Discord embed for this message.
    pub fn to_embed(&self) -> Embed {
        Embed {
            title: Some(self.title.clone()),
            url: self.url.clone(),
            color: Some(self.color),
            fields: self
                .fields
                .iter()
                .map(|f| EmbedField {
                    name: f.name.clone(),
                    value: f.value.clone(),
                    inline: true,
                })
                .collect(),
            image: self.image.clone().map(|url| EmbedImage { url }),
        }
    }
}

/// Renders events, looking up counterparty names through `N`.
pub struct Renderer<N> {
    names: N,
    collection_url: String,
}

impl<N: AccountNames> Renderer<N> {
    /// `collection_url` is the link used for events without an NFT.
    pub fn new(names: N, collection_url: impl Into<String>) -> Self {
        Self {
            names,
            collection_url: collection_url.into(),
        }
    }

    pub async fn render(&self, event: &MarketEvent) -> RenderedMessage {
        self.render_at(event, OffsetDateTime::now_utc()).await
    }

    /// Render with relative times computed against `now`.
    pub async fn render_at(&self, event: &MarketEvent, now: OffsetDateTime) -> RenderedMessage {
        let mut fields = Vec::new();

        let prefix = match event {
            MarketEvent::Order(order) => self.order_fields(order, now, &mut fields).await,
            MarketEvent::Sale(sale) => self.sale_fields(sale, &mut fields).await,
            MarketEvent::Cancel(cancel) => self.cancel_fields(cancel, &mut fields).await,
            MarketEvent::Transfer(transfer) => self.transfer_fields(transfer, &mut fields).await,
        };

        let nft = event.nft();
        let title = match nft.and_then(|n| n.name.as_deref()) {
            Some(name) => format!("{prefix} {name}"),
            None => prefix,
        };

        let (url, image) = match nft {
            Some(nft) => (
                nft.opensea_url
                    .clone()
                    .or_else(|| Some(self.collection_url.clone())),
                nft.image().map(str::to_string),
            ),
            None => (Some(self.collection_url.clone()), None),
        };

        RenderedMessage {
            title,
            color: color_for(event.kind().as_str(), event.order_type()),
            fields,
            url,
            image,
        }
    }

    async fn order_fields(
        &self,
        order: &OrderEvent,
        now: OffsetDateTime,
        fields: &mut Vec<MessageField>,
    ) -> String {
        let order_type = order.order_type.as_str();

        let (prefix, price_label, time_label) = match order_type {
            "auction" => ("Auction:".to_string(), "Starting Price", "Ends"),
            "trait_offer" => {
                let prefix = match &order.criteria {
                    Some(c) => format!("Trait offer: {} -> {}", c.trait_type, c.value),
                    None => "Trait offer:".to_string(),
                };
                (prefix, "Price", "Expires")
            }
            "collection_offer" => ("Collection offer:".to_string(), "Price", "Expires"),
            t if t.contains("offer") => ("Offer:".to_string(), "Price", "Expires"),
            _ => ("Listed for sale:".to_string(), "Price", "Expires"),
        };

        if let Some(payment) = &order.payment {
            push(fields, price_label, amount(payment));
        }
        if let Some(expiration) = order.expiration_date {
            push(fields, time_label, format_relative(expiration, now));
        }
        if let Some(maker) = &order.maker {
            push(fields, "By", self.names.display_name(maker).await);
        }

        prefix
    }

    async fn sale_fields(&self, sale: &SaleEvent, fields: &mut Vec<MessageField>) -> String {
        if let Some(payment) = &sale.payment {
            push(fields, "Price", amount(payment));
        }
        if let Some(by) = sale.buyer.as_ref().or(sale.seller.as_ref()) {
            push(fields, "By", self.names.display_name(by).await);
        }
        "Purchased:".to_string()
    }

    async fn cancel_fields(&self, cancel: &CancelEvent, fields: &mut Vec<MessageField>) -> String {
        if let Some(payment) = &cancel.payment {
            push(fields, "Price", amount(payment));
        }
        if let Some(maker) = &cancel.maker {
            push(fields, "By", self.names.display_name(maker).await);
        }
        "Order canceled:".to_string()
    }

    async fn transfer_fields(
        &self,
        transfer: &TransferEvent,
        fields: &mut Vec<MessageField>,
    ) -> String {
        let minted = transfer
            .from_address
            .as_deref()
            .is_some_and(names::is_null_address);

        if let Some(from) = transfer.from_address.as_deref().filter(|_| !minted) {
            push(fields, "From", self.names.display_name(from).await);
        }
        if let Some(to) = &transfer.to_address {
            push(fields, "To", self.names.display_name(to).await);
        }

        if minted { "Minted:" } else { "Transferred:" }.to_string()
    }
}

fn amount(payment: &Payment) -> String {
    format_amount(&payment.quantity, payment.decimals, &payment.symbol)
}

fn push(fields: &mut Vec<MessageField>, name: &str, value: String) {
    fields.push(MessageField {
        name: name.to_string(),
        value,
    });
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use osbot_sdk::objects::{NftRef, TraitCriteria};
    use std::collections::HashMap;

    const COLLECTION_URL: &str = "https://opensea.io/collection/test";

    struct FixedNames(HashMap<&'static str, &'static str>);

    #[async_trait::async_trait]
    impl AccountNames for FixedNames {
        async fn display_name(&self, address: &str) -> String {
            self.0
                .get(address)
                .map(|name| name.to_string())
                .unwrap_or_else(|| short_address(address))
        }
    }

    fn renderer() -> Renderer<FixedNames> {
        let names = HashMap::from([("0xmaker", "TestUser"), ("0xbuyer", "Collector")]);
        Renderer::new(FixedNames(names), COLLECTION_URL)
    }

    fn now() -> OffsetDateTime {
        OffsetDateTime::from_unix_timestamp(1_700_000_000).unwrap()
    }

    fn eth(quantity: &str) -> Payment {
        Payment {
            quantity: quantity.to_string(),
            decimals: 18,
            symbol: "ETH".to_string(),
            token_address: None,
        }
    }

    fn test_nft() -> NftRef {
        NftRef {
            name: Some("Test NFT".to_string()),
            opensea_url: Some("https://opensea.io/test".to_string()),
            image_url: Some("https://i.seadn.io/test.png".to_string()),
            ..Default::default()
        }
    }

    fn order(order_type: &str) -> OrderEvent {
        OrderEvent {
            order_type: order_type.to_string(),
            payment: Some(eth("1000000000000000000")),
            expiration_date: Some(now().unix_timestamp() + 3 * 86_400),
            maker: Some("0xmaker".to_string()),
            criteria: None,
            nft: Some(test_nft()),
        }
    }

    fn names_of(message: &RenderedMessage) -> Vec<&str> {
        message.fields().iter().map(|f| f.name.as_str()).collect()
    }

    #[test]
    fn test_color_table() {
        assert_eq!(color_for("order", "offer"), 0xD63864);
        assert_eq!(color_for("order", "trait_offer"), 0xD63864);
        assert_eq!(color_for("order", "listing"), 0x66DCF0);
        assert_eq!(color_for("order", "auction"), 0x66DCF0);
        assert_eq!(color_for("sale", ""), 0x62B778);
        assert_eq!(color_for("cancel", ""), 0x9537B0);
        assert_eq!(color_for("transfer", ""), 0x5296D5);
        assert_eq!(color_for("redemption", ""), 0x9537B0);
        assert_eq!(color_for("listing", ""), 0x9537B0);
    }

    #[tokio::test]
    async fn test_render_listing() {
        let message = renderer()
            .render_at(&MarketEvent::Order(order("listing")), now())
            .await;

        assert_eq!(message.title(), "Listed for sale: Test NFT");
        assert_eq!(message.color(), color_for("order", "listing"));
        assert_eq!(names_of(&message), vec!["Price", "Expires", "By"]);
        assert_eq!(message.field("Price"), Some("1 ETH"));
        assert_eq!(message.field("Expires"), Some("in 3 days"));
        assert_eq!(message.field("By"), Some("TestUser"));
        assert_eq!(message.url(), Some("https://opensea.io/test"));
        assert_eq!(message.image(), Some("https://i.seadn.io/test.png"));
    }

    #[tokio::test]
    async fn test_render_auction() {
        let message = renderer()
            .render_at(&MarketEvent::Order(order("auction")), now())
            .await;

        assert_eq!(message.title(), "Auction: Test NFT");
        assert_eq!(names_of(&message), vec!["Starting Price", "Ends", "By"]);
        assert_eq!(message.field("Ends"), Some("in 3 days"));
    }

    #[tokio::test]
    async fn test_render_trait_offer() {
        let mut offer = order("trait_offer");
        offer.nft = None;
        offer.payment = Some(eth("250000000000000000"));
        offer.criteria = Some(TraitCriteria {
            trait_type: "Background".to_string(),
            value: "Blue".to_string(),
        });

        let message = renderer()
            .render_at(&MarketEvent::Order(offer), now())
            .await;

        assert_eq!(message.title(), "Trait offer: Background -> Blue");
        assert_eq!(message.color(), 0xD63864);
        assert_eq!(names_of(&message), vec!["Price", "Expires", "By"]);
        assert_eq!(message.field("Price"), Some("0.25 ETH"));
        assert_eq!(message.url(), Some(COLLECTION_URL));
        assert_eq!(message.image(), None);
    }

    #[tokio::test]
    async fn test_render_item_offer_without_maker() {
        let mut offer = order("item_offer");
        offer.maker = None;
        offer.expiration_date = None;

        let message = renderer()
            .render_at(&MarketEvent::Order(offer), now())
            .await;

        assert_eq!(message.title(), "Offer: Test NFT");
        assert_eq!(names_of(&message), vec!["Price"]);
    }

    #[tokio::test]
    async fn test_render_sale() {
        let sale = MarketEvent::Sale(SaleEvent {
            payment: Some(eth("1500000000000000000")),
            buyer: Some("0xbuyer".to_string()),
            seller: Some("0xmaker".to_string()),
            nft: Some(test_nft()),
        });

        let message = renderer().render_at(&sale, now()).await;
        assert_eq!(message.title(), "Purchased: Test NFT");
        assert_eq!(message.color(), 0x62B778);
        assert_eq!(names_of(&message), vec!["Price", "By"]);
        assert_eq!(message.field("Price"), Some("1.5 ETH"));
        assert_eq!(message.field("By"), Some("Collector"));
    }

    #[tokio::test]
    async fn test_render_collection_offer() {
        let message = renderer()
            .render_at(&MarketEvent::Order(order("collection_offer")), now())
            .await;

        assert_eq!(message.title(), "Collection offer: Test NFT");
        assert_eq!(message.color(), 0xD63864);
        assert_eq!(names_of(&message), vec!["Price", "Expires", "By"]);
    }

    #[tokio::test]
    async fn test_render_listing_without_payment() {
        let mut listing = order("listing");
        listing.payment = None;

        let message = renderer()
            .render_at(&MarketEvent::Order(listing), now())
            .await;
        assert_eq!(message.title(), "Listed for sale: Test NFT");
        assert_eq!(names_of(&message), vec!["Expires", "By"]);
        assert_eq!(message.field("By"), Some("TestUser"));

        let mut auction = order("auction");
        auction.payment = None;
        let message = renderer()
            .render_at(&MarketEvent::Order(auction), now())
            .await;
        assert_eq!(names_of(&message), vec!["Ends", "By"]);
    }

    #[tokio::test]
    async fn test_render_sale_counterparty() {
        let seller_only = MarketEvent::Sale(SaleEvent {
            payment: Some(eth("1000000000000000000")),
            buyer: None,
            seller: Some("0xmaker".to_string()),
            nft: Some(test_nft()),
        });
        let message = renderer().render_at(&seller_only, now()).await;
        assert_eq!(names_of(&message), vec!["Price", "By"]);
        assert_eq!(message.field("By"), Some("TestUser"));

        let anonymous = MarketEvent::Sale(SaleEvent {
            payment: Some(eth("1000000000000000000")),
            buyer: None,
            seller: None,
            nft: Some(test_nft()),
        });
        let message = renderer().render_at(&anonymous, now()).await;
        assert_eq!(message.title(), "Purchased: Test NFT");
        assert_eq!(names_of(&message), vec!["Price"]);
    }

    #[tokio::test]
    async fn test_render_cancel_without_maker() {
        let cancel = MarketEvent::Cancel(CancelEvent {
            payment: Some(eth("500000000000000000")),
            maker: None,
            nft: Some(test_nft()),
        });

        let message = renderer().render_at(&cancel, now()).await;
        assert_eq!(message.title(), "Order canceled: Test NFT");
        assert_eq!(names_of(&message), vec!["Price"]);
        assert_eq!(message.field("Price"), Some("0.5 ETH"));
    }

    #[tokio::test]
    async fn test_render_cancel() {
        let cancel = MarketEvent::Cancel(CancelEvent {
            payment: None,
            maker: Some("0xmaker".to_string()),
            nft: None,
        });

        let message = renderer().render_at(&cancel, now()).await;
        assert_eq!(message.title(), "Order canceled:");
        assert_eq!(message.color(), 0x9537B0);
        assert_eq!(names_of(&message), vec!["By"]);
        assert_eq!(message.url(), Some(COLLECTION_URL));
    }

    #[tokio::test]
    async fn test_render_transfer_and_mint() {
        let to = "0x1234567890abcdef1234567890abcdef1234abcd";
        let transfer = MarketEvent::Transfer(TransferEvent {
            from_address: Some("0xbuyer".to_string()),
            to_address: Some(to.to_string()),
            nft: Some(test_nft()),
        });
        let message = renderer().render_at(&transfer, now()).await;
        assert_eq!(message.title(), "Transferred: Test NFT");
        assert_eq!(message.color(), 0x5296D5);
        assert_eq!(message.field("From"), Some("Collector"));
        assert_eq!(message.field("To"), Some("0x1234…abcd"));

        let mint = MarketEvent::Transfer(TransferEvent {
            from_address: Some(names::NULL_ADDRESS.to_string()),
            to_address: Some(to.to_string()),
            nft: Some(test_nft()),
        });
        let message = renderer().render_at(&mint, now()).await;
        assert_eq!(message.title(), "Minted: Test NFT");
        assert_eq!(names_of(&message), vec!["To"]);
    }

    #[tokio::test]
    async fn test_embed_conversion() {
        let message = renderer()
            .render_at(&MarketEvent::Order(order("listing")), now())
            .await;
        let embed = message.to_embed();

        assert_eq!(embed.title.as_deref(), Some("Listed for sale: Test NFT"));
        assert_eq!(embed.color, Some(0x66DCF0));
        assert_eq!(embed.fields.len(), 3);
        assert!(embed.fields.iter().all(|f| f.inline));
        assert_eq!(
            embed.image.map(|i| i.url).as_deref(),
            Some("https://i.seadn.io/test.png")
        );
    }
}
