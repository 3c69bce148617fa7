//! Discord REST client (bot token authentication).

use reqwest::Client;
use url::Url;

use super::{ClientError, parse_response};
use crate::objects::{DiscordChannel, DiscordUser, Embed, MessagePayload};

/// Typed HTTP client for the Discord REST API, v10.
///
/// Every request carries `Authorization: Bot <token>`. There is no gateway
/// session; [`login`](DiscordClient::login) only checks that the token is
/// accepted.
#[derive(Debug, Clone)]
pub struct DiscordClient {
    http: Client,
    base_url: Url,
    token: String,
}

impl DiscordClient {
    const API_URL: &str = "https://discord.com/api/v10/";

    pub fn new(token: impl Into<String>) -> Result<Self, ClientError> {
        Ok(Self {
            http: Client::new(),
            base_url: Url::parse(Self::API_URL)?,
            token: token.into(),
        })
    }

    /// Replace the default `reqwest::Client` with a custom one.
    pub fn with_http_client(mut self, client: Client) -> Self {
        self.http = client;
        self
    }

    fn authorization(&self) -> String {
        format!("Bot {}", self.token)
    }

    /// `GET /users/@me` – validate the token and return the bot user.
    pub async fn login(&self) -> Result<DiscordUser, ClientError> {
        let url = self.base_url.join("users/@me")?;

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `GET /channels/{id}`.
    pub async fn fetch_channel(&self, channel_id: &str) -> Result<DiscordChannel, ClientError> {
        let url = self
            .base_url
            .join(&format!("channels/{}", urlencoding::encode(channel_id)))?;

        let resp = self
            .http
            .get(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .send()
            .await?;

        parse_response(resp).await
    }

    /// `POST /channels/{id}/messages` with embeds only.
    pub async fn send_embeds(
        &self,
        channel_id: &str,
        embeds: Vec<Embed>,
    ) -> Result<(), ClientError> {
        let url = self.base_url.join(&format!(
            "channels/{}/messages",
            urlencoding::encode(channel_id)
        ))?;

        let resp = self
            .http
            .post(url)
            .header(reqwest::header::AUTHORIZATION, self.authorization())
            .json(&MessagePayload { embeds })
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(ClientError::Api { status, body });
        }
        Ok(())
    }
}
