pub mod account;
pub mod discord;
pub mod embed;
pub mod event;

pub use account::Account;
pub use discord::{DiscordChannel, DiscordUser};
pub use embed::{Embed, EmbedField, EmbedImage, MessagePayload};
pub use event::{
    AssetEventsPage, Criteria, EventBatch, NftRef, Payment, RawEvent, RejectedEvent, TraitCriteria,
};
