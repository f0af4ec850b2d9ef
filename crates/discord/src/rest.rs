use reqwest::{header, Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;
use tracing::warn;

use crate::interactions::CommandDefinition;

const USER_AGENT: &str = "Omfori (https://github.com/omfori, 1.0.0)";

#[derive(Debug, Error)]
pub enum RestError {
    #[error("discord api returned {status}: {body}")]
    Status { status: StatusCode, body: String },
    #[error("discord api transport failure: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A command already installed for an application + guild, as returned by
/// the list endpoint. Only the name matters to registration.
#[derive(Clone, Debug, Deserialize)]
pub struct InstalledCommand {
    pub name: String,
}

/// REST client for Discord's versioned API. Constructed once at bootstrap
/// and passed by clone; every call carries the bot authorization header,
/// JSON content type, and a fixed user agent.
#[derive(Clone)]
pub struct DiscordClient {
    client: Client,
    base_url: String,
    bot_token: SecretString,
}

impl DiscordClient {
    pub fn new(base_url: impl Into<String>, bot_token: SecretString) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self { client: Client::new(), base_url, bot_token }
    }

    fn commands_url(&self, application_id: &str, guild_id: &str) -> String {
        format!("{}/applications/{application_id}/guilds/{guild_id}/commands", self.base_url)
    }

    pub async fn get_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
    ) -> Result<Vec<InstalledCommand>, RestError> {
        let url = self.commands_url(application_id, guild_id);
        let response = self.send(self.client.get(url)).await?;
        Ok(response.json().await?)
    }

    pub async fn create_guild_command(
        &self,
        application_id: &str,
        guild_id: &str,
        command: &CommandDefinition,
    ) -> Result<(), RestError> {
        let url = self.commands_url(application_id, guild_id);
        self.send(self.client.post(url).json(command)).await?;
        Ok(())
    }

    async fn send(&self, builder: reqwest::RequestBuilder) -> Result<reqwest::Response, RestError> {
        let response = builder
            .header(header::AUTHORIZATION, format!("Bot {}", self.bot_token.expose_secret()))
            .header(header::CONTENT_TYPE, "application/json; charset=UTF-8")
            .header(header::USER_AGENT, USER_AGENT)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(
                event_name = "discord.rest.status_error",
                status = %status,
                "discord api call returned a non-success status"
            );
            return Err(RestError::Status { status, body });
        }

        Ok(response)
    }
}
