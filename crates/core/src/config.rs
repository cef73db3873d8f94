//! Core runtime configuration.
//!
//! Configuration is resolved once at process startup and then passed into the services. Message
//! handling never reads process-wide environment variables, which keeps behaviour consistent
//! across worker tasks and lets tests supply values through a lookup closure instead of mutating
//! the process environment.

use crate::constants::{
    DEFAULT_DB_NAME, DEFAULT_DOMAIN, DEFAULT_HEALTH_PORT, DEFAULT_MAX_WORKERS,
    DEFAULT_MONGO_MAX_POOL_SIZE, DEFAULT_POLL_TIMEOUT_SECS, DEFAULT_REQUEST_TIMEOUT_SECS,
    DEFAULT_SERVER_WORKERS, DEFAULT_SHORTENER_API_URL, DEFAULT_TELEGRAM_API_BASE,
};
use crate::{ConverterError, ConverterResult};
use std::net::{Ipv4Addr, SocketAddr};
use std::str::FromStr;
use std::time::Duration;

/// Telegram Bot API settings.
#[derive(Clone, Debug)]
pub struct TelegramConfig {
    bot_token: String,
    api_base: String,
    poll_timeout: Duration,
}

impl TelegramConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConverterResult<Self> {
        let bot_token = non_empty(&lookup, "CONVERTER_BOT_TOKEN")
            .ok_or_else(|| ConverterError::Config("CONVERTER_BOT_TOKEN must be set".into()))?;
        let api_base = non_empty(&lookup, "TELEGRAM_API_BASE")
            .unwrap_or_else(|| DEFAULT_TELEGRAM_API_BASE.into());
        let poll_timeout = Duration::from_secs(parse_var(
            &lookup,
            "POLL_TIMEOUT_SECS",
            DEFAULT_POLL_TIMEOUT_SECS,
        )?);

        Ok(Self {
            bot_token,
            api_base,
            poll_timeout,
        })
    }

    pub fn bot_token(&self) -> &str {
        &self.bot_token
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn poll_timeout(&self) -> Duration {
        self.poll_timeout
    }
}

/// MongoDB connection settings.
#[derive(Clone, Debug)]
pub struct MongoConfig {
    uri: String,
    db_name: String,
    max_pool_size: u32,
}

impl MongoConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConverterResult<Self> {
        let uri = non_empty(&lookup, "MONGODB_URI")
            .ok_or_else(|| ConverterError::Config("MONGODB_URI must be set".into()))?;
        let db_name = non_empty(&lookup, "MONGO_DB_NAME").unwrap_or_else(|| DEFAULT_DB_NAME.into());
        let max_pool_size = parse_var(&lookup, "MONGO_MAX_POOL_SIZE", DEFAULT_MONGO_MAX_POOL_SIZE)?;

        Ok(Self {
            uri,
            db_name,
            max_pool_size,
        })
    }

    pub fn from_env() -> ConverterResult<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn uri(&self) -> &str {
        &self.uri
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn max_pool_size(&self) -> u32 {
        self.max_pool_size
    }
}

/// Link acceptance and shortener endpoint settings.
#[derive(Clone, Debug)]
pub struct ShortenerConfig {
    api_url: String,
    domain: String,
}

impl ShortenerConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConverterResult<Self> {
        let api_url = non_empty(&lookup, "SHORTENER_API_URL")
            .unwrap_or_else(|| DEFAULT_SHORTENER_API_URL.into());
        let domain = non_empty(&lookup, "VIRALBOX_DOMAIN")
            .map(|d| d.to_ascii_lowercase())
            .unwrap_or_else(|| DEFAULT_DOMAIN.into());

        Ok(Self { api_url, domain })
    }

    pub fn from_env() -> ConverterResult<Self> {
        Self::from_lookup(env_lookup)
    }

    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }
}

/// Health-check server settings.
///
/// `workers` is the size of the message handler pool. It lives here because the health endpoint
/// reports it, and the standalone health server must be able to read it without a bot token.
#[derive(Clone, Debug)]
pub struct HealthConfig {
    port: u16,
    enabled: bool,
    workers: usize,
    server_workers: usize,
    request_timeout: Duration,
}

impl HealthConfig {
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConverterResult<Self> {
        let port = parse_var(&lookup, "PORT", DEFAULT_HEALTH_PORT)?;
        let enabled = parse_flag(&lookup, "HEALTH_SERVER_ENABLED", true)?;
        let workers = parse_var(&lookup, "MAX_WORKERS", DEFAULT_MAX_WORKERS)?;
        let server_workers = parse_var(&lookup, "SERVER_WORKERS", DEFAULT_SERVER_WORKERS)?;
        let request_timeout = Duration::from_secs(parse_var(
            &lookup,
            "REQUEST_TIMEOUT_SECS",
            DEFAULT_REQUEST_TIMEOUT_SECS,
        )?);

        if workers == 0 {
            return Err(ConverterError::Config(
                "MAX_WORKERS must be greater than zero".into(),
            ));
        }
        if server_workers == 0 {
            return Err(ConverterError::Config(
                "SERVER_WORKERS must be greater than zero".into(),
            ));
        }

        Ok(Self {
            port,
            enabled,
            workers,
            server_workers,
            request_timeout,
        })
    }

    pub fn from_env() -> ConverterResult<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Address the health server binds to (all interfaces).
    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((Ipv4Addr::UNSPECIFIED, self.port))
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn enabled(&self) -> bool {
        self.enabled
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    pub fn server_workers(&self) -> usize {
        self.server_workers
    }

    pub fn request_timeout(&self) -> Duration {
        self.request_timeout
    }
}

/// Full bot configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    telegram: TelegramConfig,
    mongo: MongoConfig,
    shortener: ShortenerConfig,
    health: HealthConfig,
}

impl CoreConfig {
    /// Resolve configuration from the process environment.
    ///
    /// Call `dotenvy::dotenv()` first if a `.env` file should be honoured.
    pub fn from_env() -> ConverterResult<Self> {
        Self::from_lookup(env_lookup)
    }

    /// Resolve configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    /// Returns `ConverterError::Config` if the bot token or MongoDB URI is missing, or if a
    /// numeric variable cannot be parsed.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> ConverterResult<Self> {
        if non_empty(&lookup, "CONVERTER_BOT_TOKEN").is_none()
            || non_empty(&lookup, "MONGODB_URI").is_none()
        {
            return Err(ConverterError::Config(
                "CONVERTER_BOT_TOKEN and MONGODB_URI must be set".into(),
            ));
        }

        Ok(Self {
            telegram: TelegramConfig::from_lookup(&lookup)?,
            mongo: MongoConfig::from_lookup(&lookup)?,
            shortener: ShortenerConfig::from_lookup(&lookup)?,
            health: HealthConfig::from_lookup(&lookup)?,
        })
    }

    pub fn telegram(&self) -> &TelegramConfig {
        &self.telegram
    }

    pub fn mongo(&self) -> &MongoConfig {
        &self.mongo
    }

    pub fn shortener(&self) -> &ShortenerConfig {
        &self.shortener
    }

    pub fn health(&self) -> &HealthConfig {
        &self.health
    }

    pub fn max_workers(&self) -> usize {
        self.health.workers
    }
}

fn env_lookup(key: &str) -> Option<String> {
    std::env::var(key).ok()
}

fn non_empty(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<String> {
    lookup(key)
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_var<T: FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: T,
) -> ConverterResult<T> {
    match non_empty(lookup, key) {
        Some(value) => value
            .parse()
            .map_err(|_| ConverterError::Config(format!("{key} must be a number, got {value:?}"))),
        None => Ok(default),
    }
}

fn parse_flag(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &str,
    default: bool,
) -> ConverterResult<bool> {
    match non_empty(lookup, key).map(|v| v.to_ascii_lowercase()) {
        Some(value) => match value.as_str() {
            "1" | "true" | "yes" | "on" => Ok(true),
            "0" | "false" | "no" | "off" => Ok(false),
            _ => Err(ConverterError::Config(format!(
                "{key} must be true or false, got {value:?}"
            ))),
        },
        None => Ok(default),
    }
}
