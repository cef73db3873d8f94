//! # Converter Core
//!
//! Core logic for the link converter bot.
//!
//! This crate contains everything the bot does between Telegram and MongoDB:
//! - Startup configuration resolved from the environment
//! - Telegram Bot API access and the long-polling worker pool
//! - Link extraction, domain checks and re-shortening through the shortener API
//! - Storage of user API keys and converted links
//!
//! **No HTTP server concerns**: the health-check API lives in `api-rest`, with shared response
//! types in `api-shared`.

pub mod config;
pub mod constants;
pub mod error;
pub mod handler;
pub mod links;
pub mod poller;
pub mod shortener;
pub mod store;
pub mod telegram;

pub use config::{CoreConfig, HealthConfig, MongoConfig, ShortenerConfig, TelegramConfig};
pub use error::{ConverterError, ConverterResult};
pub use handler::{ConverterBot, Outcome, RejectReason};
pub use poller::Poller;
pub use shortener::{Shortener, ViralboxShortener};
pub use store::{LinkStore, MemoryLinkStore, MongoLinkStore};
pub use telegram::{BotApi, TelegramClient};
