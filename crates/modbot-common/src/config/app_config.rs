//! Application configuration structs
//!
//! Loads configuration from environment variables (and `.env` when present).

use serde::Deserialize;
use std::env;

/// Main application configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub app: AppSettings,
    pub database: DatabaseConfig,
    pub bot: BotConfig,
    pub webhook: ServerConfig,
    pub moderation: ModerationSettings,
}

/// General application settings
#[derive(Debug, Clone, Deserialize)]
pub struct AppSettings {
    #[serde(default = "default_app_name")]
    pub name: String,
    #[serde(default = "default_env")]
    pub env: Environment,
}

/// Environment type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Staging,
    Production,
}

impl Environment {
    #[must_use]
    pub fn is_production(&self) -> bool {
        matches!(self, Self::Production)
    }
}

/// Webhook listener configuration
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl ServerConfig {
    #[must_use]
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Database configuration
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
}

/// Bot API credentials
#[derive(Debug, Clone, Deserialize)]
pub struct BotConfig {
    pub token: String,
    #[serde(default = "default_api_url")]
    pub api_url: String,
    /// Own username, used to recognise `/command@botname`
    #[serde(default)]
    pub username: String,
}

/// Tunables of the moderation engine
#[derive(Debug, Clone, Deserialize)]
pub struct ModerationSettings {
    /// Default of the `mention=` flag for `/mods` and `/restrict`
    #[serde(default)]
    pub mention_default: bool,
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: i64,
    #[serde(default = "default_escalation_mute_secs")]
    pub escalation_mute_secs: i64,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: i64,
}

impl Default for ModerationSettings {
    fn default() -> Self {
        Self {
            mention_default: false,
            warn_threshold: default_warn_threshold(),
            escalation_mute_secs: default_escalation_mute_secs(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

// Default value functions
fn default_app_name() -> String {
    "modbot".to_string()
}

fn default_env() -> Environment {
    Environment::Development
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_max_connections() -> u32 {
    10
}

fn default_min_connections() -> u32 {
    1
}

fn default_api_url() -> String {
    "https://api.telegram.org".to_string()
}

fn default_warn_threshold() -> i64 {
    3
}

fn default_escalation_mute_secs() -> i64 {
    3_600 // 1 hour
}

fn default_session_ttl_secs() -> i64 {
    3_600
}

/// Parse a boolean flag (`1/true/yes/on`, `0/false/no/off`)
pub(crate) fn parse_flag(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Errors
    /// Returns an error if required environment variables are missing or malformed
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |name: &'static str| lookup(name).ok_or(ConfigError::MissingVar(name));

        Ok(Self {
            app: AppSettings {
                name: lookup("APP_NAME").unwrap_or_else(default_app_name),
                env: lookup("APP_ENV")
                    .and_then(|s| match s.to_lowercase().as_str() {
                        "production" => Some(Environment::Production),
                        "staging" => Some(Environment::Staging),
                        "development" => Some(Environment::Development),
                        _ => None,
                    })
                    .unwrap_or_default(),
            },
            database: DatabaseConfig {
                url: required("DATABASE_URL")?,
                max_connections: parse_or(&lookup, "DATABASE_MAX_CONNECTIONS", default_max_connections)?,
                min_connections: parse_or(&lookup, "DATABASE_MIN_CONNECTIONS", default_min_connections)?,
            },
            bot: BotConfig {
                token: required("BOT_TOKEN")?,
                api_url: lookup("BOT_API_URL").unwrap_or_else(default_api_url),
                username: lookup("BOT_USERNAME")
                    .map(|s| s.trim_start_matches('@').to_string())
                    .unwrap_or_default(),
            },
            webhook: ServerConfig {
                host: lookup("WEBHOOK_HOST").unwrap_or_else(default_host),
                port: parse_or(&lookup, "WEBHOOK_PORT", default_port)?,
            },
            moderation: ModerationSettings {
                mention_default: match lookup("MODERATION_MENTION_DEFAULT") {
                    Some(raw) => parse_flag(&raw)
                        .ok_or(ConfigError::InvalidValue("MODERATION_MENTION_DEFAULT", raw))?,
                    None => false,
                },
                warn_threshold: parse_or(&lookup, "MODERATION_WARN_THRESHOLD", default_warn_threshold)?,
                escalation_mute_secs: parse_or(
                    &lookup,
                    "MODERATION_ESCALATION_MUTE_SECS",
                    default_escalation_mute_secs,
                )?,
                session_ttl_secs: parse_or(
                    &lookup,
                    "MODERATION_SESSION_TTL_SECS",
                    default_session_ttl_secs,
                )?,
            },
        })
    }
}

fn parse_or<F, T>(lookup: &F, name: &'static str, default: fn() -> T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: std::str::FromStr,
{
    match lookup(name) {
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidValue(name, raw)),
        None => Ok(default()),
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingVar(&'static str),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(&'static str, String),
}
