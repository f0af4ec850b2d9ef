use async_trait::async_trait;
use tracing::info;

use crate::interactions::CommandDefinition;
use crate::rest::{DiscordClient, InstalledCommand, RestError};

/// What `ensure_guild_command` decided to do. Returned instead of being
/// logged-and-swallowed at the call site so the caller owns the
/// failure-is-non-fatal policy.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RegistrationOutcome {
    /// Registration was disabled via empty application or guild id.
    Skipped,
    /// A command with the same name is already installed.
    AlreadyInstalled,
    /// The command was installed by this call.
    Installed,
}

/// The two REST operations registration needs, seamed out so tests can
/// substitute an in-memory double for the real client.
#[async_trait]
pub trait CommandsApi {
    async fn get_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
    ) -> Result<Vec<InstalledCommand>, RestError>;

    async fn create_guild_command(
        &self,
        application_id: &str,
        guild_id: &str,
        command: &CommandDefinition,
    ) -> Result<(), RestError>;
}

#[async_trait]
impl CommandsApi for DiscordClient {
    async fn get_guild_commands(
        &self,
        application_id: &str,
        guild_id: &str,
    ) -> Result<Vec<InstalledCommand>, RestError> {
        DiscordClient::get_guild_commands(self, application_id, guild_id).await
    }

    async fn create_guild_command(
        &self,
        application_id: &str,
        guild_id: &str,
        command: &CommandDefinition,
    ) -> Result<(), RestError> {
        DiscordClient::create_guild_command(self, application_id, guild_id, command).await
    }
}

/// Install `command` for the application + guild unless a command with the
/// same name is already present.
///
/// Matching is by name only, so edits to an existing command's description
/// or type are never propagated. That mirrors the platform workflow this
/// service supports: delete and re-add a command to change it.
pub async fn ensure_guild_command<A>(
    api: &A,
    application_id: &str,
    guild_id: &str,
    command: &CommandDefinition,
) -> Result<RegistrationOutcome, RestError>
where
    A: CommandsApi + Sync,
{
    if application_id.is_empty() || guild_id.is_empty() {
        return Ok(RegistrationOutcome::Skipped);
    }

    let installed = api.get_guild_commands(application_id, guild_id).await?;

    if installed.iter().any(|existing| existing.name == command.name) {
        info!(
            event_name = "discord.registry.already_installed",
            command = %command.name,
            "command already installed, leaving it untouched"
        );
        return Ok(RegistrationOutcome::AlreadyInstalled);
    }

    info!(
        event_name = "discord.registry.installing",
        command = %command.name,
        "installing guild command"
    );
    api.create_guild_command(application_id, guild_id, command).await?;

    Ok(RegistrationOutcome::Installed)
}
