//! Discord Integration - interactions webhook interface
//!
//! This crate provides the Discord interface for omfori:
//! - **Interactions** (`interactions`) - payload model and slash-command dispatch
//! - **Verification** (`verify`) - Ed25519 request signature checks
//! - **REST** (`rest`) - versioned Discord REST API client
//! - **Registry** (`registry`) - idempotent guild command registration
//!
//! # Getting Started
//!
//! 1. Create a Discord app at https://discord.com/developers/applications
//! 2. Point its Interactions Endpoint URL at `POST /interactions`
//! 3. Set config: `OMFORI_DISCORD_PUBLIC_KEY`, `OMFORI_DISCORD_BOT_TOKEN`
//! 4. Optionally set `OMFORI_DISCORD_APPLICATION_ID` and
//!    `OMFORI_DISCORD_GUILD_ID` to register the `/foo` command at startup
//!
//! # Key Types
//!
//! - `RequestVerifier` - verifies signatures over the raw request bytes
//! - `DiscordClient` - REST client carrying the bot token and user agent
//! - `dispatch` - interaction → response, the whole command surface
//! - `ensure_guild_command` - read-then-conditionally-write registration

pub mod interactions;
pub mod registry;
pub mod rest;
pub mod verify;

pub use interactions::{
    dispatch, CommandDefinition, Interaction, InteractionResponse, InteractionType, MessageData,
    ResponseType,
};
pub use registry::{ensure_guild_command, CommandsApi, RegistrationOutcome};
pub use rest::{DiscordClient, InstalledCommand, RestError};
pub use verify::{PublicKeyError, RequestVerifier, VerifyError, SIGNATURE_HEADER, TIMESTAMP_HEADER};
