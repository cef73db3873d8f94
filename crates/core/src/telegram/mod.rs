//! Telegram Bot API access.
//!
//! [`BotApi`] is the seam the handler and poller talk to; [`TelegramClient`] implements it over
//! HTTP with `reqwest`.

mod client;
mod types;

pub use client::TelegramClient;
pub use types::{ApiResponse, Chat, FileRef, MediaKind, Message, PhotoSize, Update, User};

use crate::ConverterResult;
use async_trait::async_trait;
use std::time::Duration;

#[async_trait]
pub trait BotApi: Send + Sync {
    /// Long-poll for updates starting at `offset`.
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> ConverterResult<Vec<Update>>;

    /// Send a plain text message.
    async fn send_message(&self, chat_id: i64, text: &str) -> ConverterResult<()>;

    /// Re-send a media file by `file_id`, with an optional caption.
    async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        file_id: &str,
        caption: Option<&str>,
    ) -> ConverterResult<()>;
}
