//! Persistence for user API keys and converted links.

mod memory;
mod mongo;

pub use memory::MemoryLinkStore;
pub use mongo::MongoLinkStore;

use crate::ConverterResult;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};

/// A user's shortener API key, keyed by Telegram user id.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserApiRecord {
    #[serde(rename = "userId")]
    pub user_id: i64,
    #[serde(rename = "apiKey")]
    pub api_key: String,
}

/// A short link and the long URL it resolves to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRecord {
    #[serde(rename = "longURL")]
    pub long_url: String,
    #[serde(rename = "shortURL")]
    pub short_url: String,
}

#[async_trait]
pub trait LinkStore: Send + Sync {
    /// Insert or replace the API key for `user_id`.
    async fn save_api_key(&self, user_id: i64, api_key: &str) -> ConverterResult<()>;

    async fn get_api_key(&self, user_id: i64) -> ConverterResult<Option<String>>;

    /// Record a newly created short link.
    async fn save_converted(&self, long_url: &str, short_url: &str) -> ConverterResult<()>;

    /// Resolve a short link to its long URL.
    async fn find_long_url(&self, short_url: &str) -> ConverterResult<Option<String>>;
}
