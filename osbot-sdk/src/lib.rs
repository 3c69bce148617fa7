//! Wire types and HTTP clients used by osbot.
//!
//! `objects` holds the serde shapes of the OpenSea event feed and the Discord
//! embed payload. The reqwest based clients live in `client`, gated behind the
//! `client` feature.

pub mod objects;

#[cfg(feature = "client")]
pub mod client;
