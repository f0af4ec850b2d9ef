mod bootstrap;
mod interactions;

use anyhow::Result;
use omfori_core::config::{AppConfig, LoadOptions};
use omfori_discord::interactions::CommandDefinition;
use omfori_discord::registry::ensure_guild_command;
use omfori_discord::rest::DiscordClient;
use tracing::{error, info};

fn init_logging(config: &AppConfig) {
    use omfori_core::config::LogFormat::*;
    use tracing::Level;

    let log_level = config.logging.level.parse::<Level>().unwrap_or(Level::INFO);

    match config.logging.format {
        Compact => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).compact().init();
        }
        Pretty => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).pretty().init();
        }
        Json => {
            tracing_subscriber::fmt().with_target(false).with_max_level(log_level).json().init();
        }
    }
}

/// The single command this service registers and answers.
fn guild_command() -> CommandDefinition {
    CommandDefinition::chat_input("foo", "foo")
}

#[tokio::main]
async fn main() -> Result<()> {
    run().await
}

pub async fn run() -> Result<()> {
    // Load config and initialize logging before any other operations
    let config = AppConfig::load(LoadOptions::default())?;
    init_logging(&config);

    let app = bootstrap::bootstrap_with_config(config)?;

    let address = format!("{}:{}", app.config.server.bind_address, app.config.server.port);
    let listener = tokio::net::TcpListener::bind(&address).await?;

    info!(
        event_name = "system.server.listening",
        bind_address = %address,
        port = app.config.server.port,
        "omfori listening"
    );

    // Fire-and-forget: the listener accepts traffic without waiting for
    // registration, and the registration calls run concurrently with normal
    // request handling. Failure here never takes the process down.
    spawn_registration(
        app.client.clone(),
        app.config.discord.application_id.clone(),
        app.config.discord.guild_id.clone(),
    );

    axum::serve(listener, interactions::router(app.verifier.clone()))
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;

    info!(event_name = "system.server.stopped", "omfori stopped");

    Ok(())
}

fn spawn_registration(client: DiscordClient, application_id: String, guild_id: String) {
    tokio::spawn(async move {
        let command = guild_command();
        match ensure_guild_command(&client, &application_id, &guild_id, &command).await {
            Ok(outcome) => info!(
                event_name = "discord.registration.finished",
                command = %command.name,
                outcome = ?outcome,
                "command registration finished"
            ),
            Err(err) => error!(
                event_name = "discord.registration.failed",
                command = %command.name,
                error = %err,
                "command registration failed, continuing without it"
            ),
        }
    });
}

async fn wait_for_shutdown() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!(
            event_name = "system.server.signal_error",
            error = %err,
            "could not listen for the shutdown signal"
        );
    }
}
