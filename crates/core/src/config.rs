use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Length of a hex-encoded Ed25519 verifying key.
const PUBLIC_KEY_HEX_LEN: usize = 64;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub discord: DiscordConfig,
    pub logging: LoggingConfig,
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub bind_address: String,
    pub port: u16,
}

#[derive(Clone, Debug)]
pub struct DiscordConfig {
    /// Hex-encoded Ed25519 public key used to verify interaction signatures.
    pub public_key: String,
    pub bot_token: SecretString,
    /// Application and guild the startup command registration targets.
    /// Leaving either empty disables registration entirely.
    pub application_id: String,
    pub guild_id: String,
    pub api_base_url: String,
}

#[derive(Clone, Debug)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    Compact,
    Pretty,
    Json,
}

#[derive(Clone, Debug, Default)]
pub struct ConfigOverrides {
    pub port: Option<u16>,
    pub public_key: Option<String>,
    pub bot_token: Option<String>,
    pub application_id: Option<String>,
    pub guild_id: Option<String>,
    pub api_base_url: Option<String>,
    pub log_level: Option<String>,
}

#[derive(Clone, Debug, Default)]
pub struct LoadOptions {
    pub config_path: Option<PathBuf>,
    pub require_file: bool,
    pub overrides: ConfigOverrides,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file `{path}`: {source}")]
    ReadFile { path: PathBuf, source: std::io::Error },
    #[error("could not parse config file `{path}`: {source}")]
    ParseFile { path: PathBuf, source: toml::de::Error },
    #[error("required config file was not found: `{0}`")]
    MissingConfigFile(PathBuf),
    #[error("environment variable interpolation failed for `{var}`")]
    MissingEnvInterpolation { var: String },
    #[error("unterminated environment interpolation expression")]
    UnterminatedInterpolation,
    #[error("invalid environment override for `{key}`: `{value}`")]
    InvalidEnvOverride { key: String, value: String },
    #[error("configuration validation failed: {0}")]
    Validation(String),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            server: ServerConfig { bind_address: "127.0.0.1".to_string(), port: 3001 },
            discord: DiscordConfig {
                public_key: String::new(),
                bot_token: String::new().into(),
                application_id: String::new(),
                guild_id: String::new(),
                api_base_url: "https://discord.com/api/v10".to_string(),
            },
            logging: LoggingConfig { level: "info".to_string(), format: LogFormat::Compact },
        }
    }
}

fn secret_value(value: String) -> SecretString {
    value.into()
}

impl std::str::FromStr for LogFormat {
    type Err = ConfigError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "compact" => Ok(Self::Compact),
            "pretty" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(ConfigError::Validation(format!(
                "unsupported log format `{other}` (expected compact|pretty|json)"
            ))),
        }
    }
}

#[derive(Debug, Default, Deserialize)]
struct ConfigPatch {
    server: Option<ServerPatch>,
    discord: Option<DiscordPatch>,
    logging: Option<LoggingPatch>,
}

#[derive(Debug, Default, Deserialize)]
struct ServerPatch {
    bind_address: Option<String>,
    port: Option<u16>,
}

#[derive(Debug, Default, Deserialize)]
struct DiscordPatch {
    public_key: Option<String>,
    bot_token: Option<String>,
    application_id: Option<String>,
    guild_id: Option<String>,
    api_base_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct LoggingPatch {
    level: Option<String>,
    format: Option<LogFormat>,
}

impl AppConfig {
    pub fn load(options: LoadOptions) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let maybe_path = resolve_config_path(options.config_path.as_deref());

        if let Some(path) = maybe_path {
            let patch = read_patch(&path)?;
            config.apply_patch(patch);
        } else if options.require_file {
            let expected = options.config_path.unwrap_or_else(|| PathBuf::from("omfori.toml"));
            return Err(ConfigError::MissingConfigFile(expected));
        }

        config.apply_env_overrides()?;
        config.apply_overrides(options.overrides);
        config.validate()?;

        Ok(config)
    }

    fn apply_patch(&mut self, patch: ConfigPatch) {
        if let Some(server) = patch.server {
            if let Some(bind_address) = server.bind_address {
                self.server.bind_address = bind_address;
            }
            if let Some(port) = server.port {
                self.server.port = port;
            }
        }

        if let Some(discord) = patch.discord {
            if let Some(public_key) = discord.public_key {
                self.discord.public_key = public_key;
            }
            if let Some(bot_token_value) = discord.bot_token {
                self.discord.bot_token = secret_value(bot_token_value);
            }
            if let Some(application_id) = discord.application_id {
                self.discord.application_id = application_id;
            }
            if let Some(guild_id) = discord.guild_id {
                self.discord.guild_id = guild_id;
            }
            if let Some(api_base_url) = discord.api_base_url {
                self.discord.api_base_url = api_base_url;
            }
        }

        if let Some(logging) = patch.logging {
            if let Some(level) = logging.level {
                self.logging.level = level;
            }
            if let Some(format) = logging.format {
                self.logging.format = format;
            }
        }
    }

    fn apply_env_overrides(&mut self) -> Result<(), ConfigError> {
        if let Some(value) = read_env("OMFORI_SERVER_BIND_ADDRESS") {
            self.server.bind_address = value;
        }
        if let Some(value) = read_env("OMFORI_SERVER_PORT") {
            self.server.port = parse_u16("OMFORI_SERVER_PORT", &value)?;
        }

        if let Some(value) = read_env("OMFORI_DISCORD_PUBLIC_KEY") {
            self.discord.public_key = value;
        }
        if let Some(value) = read_env("OMFORI_DISCORD_BOT_TOKEN") {
            self.discord.bot_token = secret_value(value);
        }
        if let Some(value) = read_env("OMFORI_DISCORD_APPLICATION_ID") {
            self.discord.application_id = value;
        }
        if let Some(value) = read_env("OMFORI_DISCORD_GUILD_ID") {
            self.discord.guild_id = value;
        }
        if let Some(value) = read_env("OMFORI_DISCORD_API_BASE_URL") {
            self.discord.api_base_url = value;
        }

        let log_level = read_env("OMFORI_LOGGING_LEVEL").or_else(|| read_env("OMFORI_LOG_LEVEL"));
        if let Some(value) = log_level {
            self.logging.level = value;
        }
        let log_format =
            read_env("OMFORI_LOGGING_FORMAT").or_else(|| read_env("OMFORI_LOG_FORMAT"));
        if let Some(value) = log_format {
            self.logging.format = value.parse()?;
        }

        Ok(())
    }

    fn apply_overrides(&mut self, overrides: ConfigOverrides) {
        if let Some(port) = overrides.port {
            self.server.port = port;
        }
        if let Some(public_key) = overrides.public_key {
            self.discord.public_key = public_key;
        }
        if let Some(bot_token) = overrides.bot_token {
            self.discord.bot_token = secret_value(bot_token);
        }
        if let Some(application_id) = overrides.application_id {
            self.discord.application_id = application_id;
        }
        if let Some(guild_id) = overrides.guild_id {
            self.discord.guild_id = guild_id;
        }
        if let Some(api_base_url) = overrides.api_base_url {
            self.discord.api_base_url = api_base_url;
        }
        if let Some(log_level) = overrides.log_level {
            self.logging.level = log_level;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        validate_server(&self.server)?;
        validate_discord(&self.discord)?;
        validate_logging(&self.logging)?;
        Ok(())
    }
}

fn resolve_config_path(explicit_path: Option<&Path>) -> Option<PathBuf> {
    if let Some(path) = explicit_path {
        return path.exists().then_some(path.to_path_buf());
    }

    [PathBuf::from("omfori.toml"), PathBuf::from("config/omfori.toml")]
        .into_iter()
        .find(|path| path.exists())
}

fn read_patch(path: &Path) -> Result<ConfigPatch, ConfigError> {
    let raw = fs::read_to_string(path)
        .map_err(|source| ConfigError::ReadFile { path: path.to_path_buf(), source })?;

    let interpolated = interpolate_env_vars(&raw)?;
    toml::from_str::<ConfigPatch>(&interpolated)
        .map_err(|source| ConfigError::ParseFile { path: path.to_path_buf(), source })
}

fn interpolate_env_vars(input: &str) -> Result<String, ConfigError> {
    let mut output = String::with_capacity(input.len());
    let mut chars = input.chars().peekable();

    while let Some(ch) = chars.next() {
        if ch == '$' && matches!(chars.peek(), Some('{')) {
            chars.next();
            let mut key = String::new();

            loop {
                match chars.next() {
                    Some('}') => break,
                    Some(next) => key.push(next),
                    None => return Err(ConfigError::UnterminatedInterpolation),
                }
            }

            let value = env::var(&key)
                .map_err(|_| ConfigError::MissingEnvInterpolation { var: key.clone() })?;
            output.push_str(&value);
            continue;
        }

        output.push(ch);
    }

    Ok(output)
}

fn validate_server(server: &ServerConfig) -> Result<(), ConfigError> {
    if server.bind_address.trim().is_empty() {
        return Err(ConfigError::Validation("server.bind_address must not be empty".to_string()));
    }

    if server.port == 0 {
        return Err(ConfigError::Validation(
            "server.port must be greater than zero".to_string(),
        ));
    }

    Ok(())
}

fn validate_discord(discord: &DiscordConfig) -> Result<(), ConfigError> {
    let public_key = discord.public_key.trim();
    if public_key.is_empty() {
        return Err(ConfigError::Validation(
            "discord.public_key is required. Get it from https://discord.com/developers/applications > Your App > General Information".to_string()
        ));
    }
    if public_key.len() != PUBLIC_KEY_HEX_LEN || hex::decode(public_key).is_err() {
        return Err(ConfigError::Validation(format!(
            "discord.public_key must be a {PUBLIC_KEY_HEX_LEN}-character hex string"
        )));
    }

    if discord.bot_token.expose_secret().is_empty() {
        return Err(ConfigError::Validation(
            "discord.bot_token is required. Get it from https://discord.com/developers/applications > Your App > Bot".to_string()
        ));
    }

    if discord.api_base_url.trim().is_empty() {
        return Err(ConfigError::Validation(
            "discord.api_base_url must not be empty".to_string(),
        ));
    }

    // application_id and guild_id are deliberately allowed to be empty:
    // that is the switch that disables startup command registration.
    Ok(())
}

fn validate_logging(logging: &LoggingConfig) -> Result<(), ConfigError> {
    let level = logging.level.trim().to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => Ok(()),
        _ => Err(ConfigError::Validation(
            "logging.level must be one of trace|debug|info|warn|error".to_string(),
        )),
    }
}

fn read_env(key: &str) -> Option<String> {
    env::var(key).ok().map(|value| value.trim().to_string()).filter(|value| !value.is_empty())
}

fn parse_u16(key: &str, value: &str) -> Result<u16, ConfigError> {
    value.parse::<u16>().map_err(|_| ConfigError::InvalidEnvOverride {
        key: key.to_string(),
        value: value.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use secrecy::ExposeSecret;

    use super::{AppConfig, ConfigError, ConfigOverrides, LoadOptions, LogFormat};

    const TEST_PUBLIC_KEY: &str =
        "0f7af2b3da5a0c4ef8c2f1f6b196915f29bbb9eb9bfd1b896a8d4fcf64e9a20c";

    fn valid_overrides() -> ConfigOverrides {
        ConfigOverrides {
            public_key: Some(TEST_PUBLIC_KEY.to_string()),
            bot_token: Some("test-bot-token".to_string()),
            ..ConfigOverrides::default()
        }
    }

    #[test]
    fn defaults_fill_in_everything_but_credentials() {
        let config = AppConfig::default();

        assert_eq!(config.server.bind_address, "127.0.0.1");
        assert_eq!(config.server.port, 3001);
        assert_eq!(config.discord.api_base_url, "https://discord.com/api/v10");
        assert!(config.discord.application_id.is_empty());
        assert!(config.discord.guild_id.is_empty());
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Compact);
    }

    #[test]
    fn load_fails_without_public_key() {
        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                bot_token: Some("test-bot-token".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("load should fail").to_string();
        assert!(message.contains("discord.public_key"));
    }

    #[test]
    fn load_rejects_non_hex_public_key() {
        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                public_key: Some("not-hex".to_string()),
                bot_token: Some("test-bot-token".to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("load should fail").to_string();
        assert!(message.contains("hex string"));
    }

    #[test]
    fn load_fails_without_bot_token() {
        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                public_key: Some(TEST_PUBLIC_KEY.to_string()),
                ..ConfigOverrides::default()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("load should fail").to_string();
        assert!(message.contains("discord.bot_token"));
    }

    #[test]
    fn load_succeeds_with_injected_credentials() {
        let config = AppConfig::load(LoadOptions {
            overrides: valid_overrides(),
            ..LoadOptions::default()
        })
        .expect("load should succeed");

        assert_eq!(config.discord.public_key, TEST_PUBLIC_KEY);
        assert_eq!(config.discord.bot_token.expose_secret(), "test-bot-token");
    }

    #[test]
    fn patch_file_values_are_applied() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[server]\nport = 8443\n\n[discord]\npublic_key = \"{TEST_PUBLIC_KEY}\"\nbot_token = \"file-token\"\napplication_id = \"app-1\"\nguild_id = \"guild-1\"\n\n[logging]\nlevel = \"debug\"\nformat = \"json\"\n"
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides::default(),
        })
        .expect("load should succeed");

        assert_eq!(config.server.port, 8443);
        assert_eq!(config.discord.application_id, "app-1");
        assert_eq!(config.discord.guild_id, "guild-1");
        assert_eq!(config.discord.bot_token.expose_secret(), "file-token");
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
    }

    #[test]
    fn programmatic_overrides_win_over_patch_file() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(
            file,
            "[server]\nport = 8443\n\n[discord]\npublic_key = \"{TEST_PUBLIC_KEY}\"\nbot_token = \"file-token\"\n"
        )
        .expect("write config");

        let config = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: ConfigOverrides {
                port: Some(9999),
                bot_token: Some("override-token".to_string()),
                ..ConfigOverrides::default()
            },
        })
        .expect("load should succeed");

        assert_eq!(config.server.port, 9999);
        assert_eq!(config.discord.bot_token.expose_secret(), "override-token");
    }

    #[test]
    fn missing_required_file_is_an_error() {
        let result = AppConfig::load(LoadOptions {
            config_path: Some("does/not/exist/omfori.toml".into()),
            require_file: true,
            overrides: valid_overrides(),
        });

        assert!(matches!(result, Err(ConfigError::MissingConfigFile(_))));
    }

    #[test]
    fn interpolation_of_unset_variable_fails() {
        let mut file = tempfile::NamedTempFile::new().expect("temp file");
        writeln!(file, "[discord]\nbot_token = \"${{OMFORI_TEST_UNSET_VARIABLE_XYZZY}}\"\n")
            .expect("write config");

        let result = AppConfig::load(LoadOptions {
            config_path: Some(file.path().to_path_buf()),
            require_file: true,
            overrides: valid_overrides(),
        });

        assert!(matches!(
            result,
            Err(ConfigError::MissingEnvInterpolation { ref var })
                if var == "OMFORI_TEST_UNSET_VARIABLE_XYZZY"
        ));
    }

    #[test]
    fn invalid_log_level_is_rejected() {
        let result = AppConfig::load(LoadOptions {
            overrides: ConfigOverrides {
                log_level: Some("loud".to_string()),
                ..valid_overrides()
            },
            ..LoadOptions::default()
        });

        let message = result.err().expect("load should fail").to_string();
        assert!(message.contains("logging.level"));
    }
}
