use super::{ApiResponse, BotApi, MediaKind, Update};
use crate::config::TelegramConfig;
use crate::ConverterResult;
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde_json::json;
use std::time::Duration;

const SEND_TIMEOUT: Duration = Duration::from_secs(10);

/// Extra time the HTTP request may take beyond the long-poll timeout.
const POLL_GRACE: Duration = Duration::from_secs(10);

/// Bot API client over `reqwest`.
///
/// API endpoint: `<api_base>/bot<token>/<method>`
#[derive(Clone)]
pub struct TelegramClient {
    client: reqwest::Client,
    base_url: String,
}

impl TelegramClient {
    pub fn new(api_base: &str, bot_token: &str) -> ConverterResult<Self> {
        let client = reqwest::Client::builder().build()?;
        Ok(Self {
            client,
            base_url: format!("{}/bot{}", api_base.trim_end_matches('/'), bot_token),
        })
    }

    pub fn from_config(cfg: &TelegramConfig) -> ConverterResult<Self> {
        Self::new(cfg.api_base(), cfg.bot_token())
    }

    fn method_url(&self, method: &str) -> String {
        format!("{}/{}", self.base_url, method)
    }

    async fn call<T: DeserializeOwned>(&self, request: reqwest::RequestBuilder) -> ConverterResult<T> {
        let response: ApiResponse<T> = request.send().await?.json().await?;
        response.into_result()
    }

    async fn post(&self, method: &str, payload: &serde_json::Value) -> ConverterResult<()> {
        let request = self
            .client
            .post(self.method_url(method))
            .timeout(SEND_TIMEOUT)
            .json(payload);
        self.call::<serde_json::Value>(request).await.map(|_| ())
    }
}

#[async_trait]
impl BotApi for TelegramClient {
    async fn get_updates(
        &self,
        offset: Option<i64>,
        timeout: Duration,
    ) -> ConverterResult<Vec<Update>> {
        let mut query = vec![("timeout", timeout.as_secs().to_string())];
        if let Some(offset) = offset {
            query.push(("offset", offset.to_string()));
        }

        let request = self
            .client
            .get(self.method_url("getUpdates"))
            .query(&query)
            .timeout(timeout + POLL_GRACE);
        self.call(request).await
    }

    async fn send_message(&self, chat_id: i64, text: &str) -> ConverterResult<()> {
        self.post("sendMessage", &json!({ "chat_id": chat_id, "text": text }))
            .await
    }

    async fn send_media(
        &self,
        chat_id: i64,
        kind: MediaKind,
        file_id: &str,
        caption: Option<&str>,
    ) -> ConverterResult<()> {
        let mut payload = json!({ "chat_id": chat_id, "caption": caption });
        payload[kind.field()] = json!(file_id);
        self.post(kind.method(), &payload).await
    }
}
