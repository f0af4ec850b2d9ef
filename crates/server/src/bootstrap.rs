use std::sync::Arc;

use omfori_core::config::{AppConfig, ConfigError, LoadOptions};
use omfori_discord::rest::DiscordClient;
use omfori_discord::verify::{PublicKeyError, RequestVerifier};
use thiserror::Error;
use tracing::info;

pub struct Application {
    pub config: AppConfig,
    pub verifier: Arc<RequestVerifier>,
    pub client: DiscordClient,
}

#[derive(Debug, Error)]
pub enum BootstrapError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("discord.public_key is unusable: {0}")]
    PublicKey(#[from] PublicKeyError),
}

pub fn bootstrap(options: LoadOptions) -> Result<Application, BootstrapError> {
    let config = AppConfig::load(options)?;
    bootstrap_with_config(config)
}

/// Build the request verifier and REST client once and hand them to the
/// router and registration task by reference, so tests can bootstrap the
/// same way with injected credentials.
pub fn bootstrap_with_config(config: AppConfig) -> Result<Application, BootstrapError> {
    let verifier = Arc::new(RequestVerifier::from_hex(&config.discord.public_key)?);
    let client =
        DiscordClient::new(config.discord.api_base_url.clone(), config.discord.bot_token.clone());

    info!(
        event_name = "system.bootstrap.ready",
        registration_enabled =
            !config.discord.application_id.is_empty() && !config.discord.guild_id.is_empty(),
        "application bootstrap complete"
    );

    Ok(Application { config, verifier, client })
}
