pub mod config;

pub use config::{AppConfig, ConfigError, ConfigOverrides, DiscordConfig, LoadOptions};
