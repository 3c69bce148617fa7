//! Processors that move events to their destinations.
//!
//! - `ChatBackend`: the chat platform seam (connect, fetch channel, send, disconnect)
//! - `DeliveryPipeline`: filters, renders, routes and sends one batch of events

pub mod backend;
pub mod delivery;

pub use backend::{BackendError, ChannelHandle, ChatBackend};
pub use delivery::{DeliveryError, DeliveryPipeline, DeliveryReport, SendOutcome};
