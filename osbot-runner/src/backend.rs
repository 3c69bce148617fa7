//! Adapters from the SDK clients to the core traits.

use async_trait::async_trait;
use osbot_core::processors::{BackendError, ChannelHandle, ChatBackend};
use osbot_core::render::RenderedMessage;
use osbot_core::render::names::{AccountNames, short_address};
use osbot_sdk::client::{DiscordClient, OpenSeaClient};
use osbot_sdk::objects::DiscordUser;

/// [`ChatBackend`] over the Discord REST API.
pub struct DiscordBackend {
    client: DiscordClient,
    user: Option<DiscordUser>,
}

impl DiscordBackend {
    pub fn new(client: DiscordClient) -> Self {
        Self { client, user: None }
    }
}

#[async_trait]
impl ChatBackend for DiscordBackend {
    async fn connect(&mut self) -> Result<(), BackendError> {
        let user = self
            .client
            .login()
            .await
            .map_err(|e| BackendError::new("login", e))?;
        tracing::info!("Logged in as {} ({})", user.username, user.id);
        self.user = Some(user);
        Ok(())
    }

    async fn fetch_channel(&mut self, channel_id: &str) -> Result<ChannelHandle, BackendError> {
        let channel = self
            .client
            .fetch_channel(channel_id)
            .await
            .map_err(|e| BackendError::new("fetch channel", e))?;
        Ok(ChannelHandle::new(channel.id, channel.name))
    }

    async fn send(
        &mut self,
        channel: &ChannelHandle,
        message: &RenderedMessage,
    ) -> Result<(), BackendError> {
        self.client
            .send_embeds(&channel.id, vec![message.to_embed()])
            .await
            .map_err(|e| BackendError::new("send message", e))
    }

    async fn disconnect(&mut self) {
        if let Some(user) = self.user.take() {
            tracing::debug!("Logged out {}", user.username);
        }
    }
}

/// [`AccountNames`] backed by OpenSea profiles.
///
/// Falls back to the shortened address when the account has no username or
/// the lookup fails.
pub struct OpenSeaNames {
    client: OpenSeaClient,
}

impl OpenSeaNames {
    pub fn new(client: OpenSeaClient) -> Self {
        Self { client }
    }
}

#[async_trait]
impl AccountNames for OpenSeaNames {
    async fn display_name(&self, address: &str) -> String {
        match self.client.account(address).await {
            Ok(account) => account
                .username()
                .map(str::to_string)
                .unwrap_or_else(|| short_address(address)),
            Err(e) => {
                tracing::debug!(address, error = %e, "Account lookup failed");
                short_address(address)
            }
        }
    }
}
