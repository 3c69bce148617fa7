//! The chat backend seam.
//!
//! The delivery pipeline only needs four operations from a chat platform.
//! The runner implements them on top of the Discord REST client; tests use
//! in-memory fakes.

use crate::render::RenderedMessage;
use async_trait::async_trait;
use std::fmt;
use thiserror::Error;

/// A live destination resolved through the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChannelHandle {
    pub id: String,
    pub name: Option<String>,
}

impl ChannelHandle {
    pub fn new(id: impl Into<String>, name: Option<String>) -> Self {
        Self {
            id: id.into(),
            name,
        }
    }
}

/// Renders as `#name`, or `#id` for unnamed channels.
impl fmt::Display for ChannelHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name.as_deref().unwrap_or(&self.id))
    }
}

/// A failed backend call.
#[derive(Debug, Error)]
#[error("{operation} failed: {source}")]
pub struct BackendError {
    pub operation: &'static str,
    #[source]
    pub source: Box<dyn std::error::Error + Send + Sync>,
}

impl BackendError {
    pub fn new(
        operation: &'static str,
        source: impl Into<Box<dyn std::error::Error + Send + Sync>>,
    ) -> Self {
        Self {
            operation,
            source: source.into(),
        }
    }
}

/// Operations the delivery pipeline consumes from a chat platform.
///
/// Calls are made strictly one at a time.
#[async_trait]
pub trait ChatBackend: Send {
    /// Authenticate. Failure is fatal to the run.
    async fn connect(&mut self) -> Result<(), BackendError>;

    /// Resolve a configured channel id.
    async fn fetch_channel(&mut self, channel_id: &str) -> Result<ChannelHandle, BackendError>;

    async fn send(
        &mut self,
        channel: &ChannelHandle,
        message: &RenderedMessage,
    ) -> Result<(), BackendError>;

    /// Release the connection. Called once at the end of every run that
    /// reached `connect`, whatever its outcome.
    async fn disconnect(&mut self);
}
