//! Shortener API client.
//!
//! Re-shortens a long URL under the caller's own account on the short-link site.

use crate::config::ShortenerConfig;
use crate::ConverterResult;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

const SHORTEN_TIMEOUT: Duration = Duration::from_secs(15);

/// Response fields that may hold the short URL, in order of preference.
const SHORT_URL_FIELDS: [&str; 3] = ["shortenedUrl", "short_url", "short"];

#[async_trait]
pub trait Shortener: Send + Sync {
    /// Shorten `long_url` with the user's `api_key`.
    ///
    /// Returns `Ok(None)` when the API answers but does not report success.
    async fn shorten(&self, api_key: &str, long_url: &str) -> ConverterResult<Option<String>>;
}

#[derive(Clone)]
pub struct ViralboxShortener {
    client: reqwest::Client,
    api_url: String,
}

impl ViralboxShortener {
    pub fn new(api_url: impl Into<String>) -> ConverterResult<Self> {
        let client = reqwest::Client::builder().timeout(SHORTEN_TIMEOUT).build()?;
        Ok(Self {
            client,
            api_url: api_url.into(),
        })
    }

    pub fn from_config(cfg: &ShortenerConfig) -> ConverterResult<Self> {
        Self::new(cfg.api_url())
    }
}

#[async_trait]
impl Shortener for ViralboxShortener {
    async fn shorten(&self, api_key: &str, long_url: &str) -> ConverterResult<Option<String>> {
        let body: Value = self
            .client
            .get(&self.api_url)
            .query(&[("api", api_key), ("url", long_url)])
            .send()
            .await?
            .json()
            .await?;

        Ok(short_url_from(&body))
    }
}

fn short_url_from(body: &Value) -> Option<String> {
    if body.get("status").and_then(Value::as_str) != Some("success") {
        tracing::debug!("shortener declined request: {}", body);
        return None;
    }

    SHORT_URL_FIELDS
        .iter()
        .filter_map(|field| body.get(*field).and_then(Value::as_str))
        .find(|s| !s.is_empty())
        .map(str::to_string)
}
