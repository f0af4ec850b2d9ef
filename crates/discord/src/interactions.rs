use serde::{Deserialize, Serialize};

/// The one slash command this service answers.
pub const KNOWN_COMMAND: &str = "foo";
const KNOWN_COMMAND_REPLY: &str = "bar";

/// CHAT_INPUT in Discord's application command type table.
pub const CHAT_INPUT_COMMAND: u8 = 1;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(from = "u8")]
pub enum InteractionType {
    Ping,
    ApplicationCommand,
    Unknown(u8),
}

impl From<u8> for InteractionType {
    fn from(value: u8) -> Self {
        match value {
            1 => Self::Ping,
            2 => Self::ApplicationCommand,
            other => Self::Unknown(other),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(into = "u8")]
pub enum ResponseType {
    Pong,
    ChannelMessageWithSource,
}

impl From<ResponseType> for u8 {
    fn from(value: ResponseType) -> Self {
        match value {
            ResponseType::Pong => 1,
            ResponseType::ChannelMessageWithSource => 4,
        }
    }
}

/// Inbound interaction payload. Only the fields the dispatcher consumes are
/// modelled; everything else Discord sends is ignored during deserialization.
#[derive(Clone, Debug, Deserialize)]
pub struct Interaction {
    #[serde(rename = "type")]
    pub kind: InteractionType,
    #[serde(default)]
    pub data: Option<CommandData>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct CommandData {
    pub name: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct InteractionResponse {
    #[serde(rename = "type")]
    pub kind: ResponseType,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<MessageData>,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct MessageData {
    pub content: String,
}

impl InteractionResponse {
    pub fn pong() -> Self {
        Self { kind: ResponseType::Pong, data: None }
    }

    pub fn message(content: impl Into<String>) -> Self {
        Self {
            kind: ResponseType::ChannelMessageWithSource,
            data: Some(MessageData { content: content.into() }),
        }
    }
}

/// Static command definition installed against a guild at startup.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct CommandDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: u8,
}

impl CommandDefinition {
    pub fn chat_input(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self { name: name.into(), description: description.into(), kind: CHAT_INPUT_COMMAND }
    }
}

/// Map an inbound interaction to its synchronous reply. No side effects and
/// no external calls; this is the entire command surface.
///
/// Every branch answers. Unmatched command names and unrecognized
/// interaction types get an explicit reply instead of leaving the HTTP
/// request hanging until a caller-side timeout.
pub fn dispatch(interaction: &Interaction) -> InteractionResponse {
    match interaction.kind {
        InteractionType::Ping => InteractionResponse::pong(),
        InteractionType::ApplicationCommand => {
            let name =
                interaction.data.as_ref().map(|data| data.name.as_str()).unwrap_or_default();
            if name == KNOWN_COMMAND {
                InteractionResponse::message(KNOWN_COMMAND_REPLY)
            } else {
                InteractionResponse::message(format!("command not found: /{name}"))
            }
        }
        InteractionType::Unknown(other) => {
            InteractionResponse::message(format!("unsupported interaction type: {other}"))
        }
    }
}
