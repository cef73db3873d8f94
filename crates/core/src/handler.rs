//! Message handling: commands, API-key management and link conversion.

use crate::constants::SUPPORT_HANDLE;
use crate::links::{extract_urls, is_domain_link};
use crate::shortener::Shortener;
use crate::store::LinkStore;
use crate::telegram::{BotApi, Message};
use std::sync::Arc;

/// What processing a message led to.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Outcome {
    /// No sender, nothing to do.
    Ignored,
    /// A `/start`, `/help` or `/set_api` command was answered.
    Command,
    /// The sender has not stored an API key yet.
    MissingApiKey,
    /// The message carried no URLs.
    NoLinks,
    /// A URL could not be converted; nothing after it was attempted.
    Rejected { url: String, reason: RejectReason },
    /// Every URL was converted; holds the new short links in order.
    Converted(Vec<String>),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RejectReason {
    ForeignDomain,
    UnknownLink,
    ShortenFailed,
}

/// Processes incoming messages against the bot, shortener and link store.
#[derive(Clone)]
pub struct ConverterBot {
    bot: Arc<dyn BotApi>,
    shortener: Arc<dyn Shortener>,
    store: Arc<dyn LinkStore>,
    domain: String,
}

impl ConverterBot {
    pub fn new(
        bot: Arc<dyn BotApi>,
        shortener: Arc<dyn Shortener>,
        store: Arc<dyn LinkStore>,
        domain: impl Into<String>,
    ) -> Self {
        Self {
            bot,
            shortener,
            store,
            domain: domain.into(),
        }
    }

    pub fn domain(&self) -> &str {
        &self.domain
    }

    /// Handle one message and reply to its chat.
    ///
    /// Failures talking to Telegram or the store are logged, never returned.
    pub async fn process_message(&self, msg: &Message) -> Outcome {
        let chat_id = msg.chat.id;
        let Some(from) = msg.from.as_ref() else {
            tracing::debug!("ignoring message without sender in chat {}", chat_id);
            return Outcome::Ignored;
        };
        let user_id = from.id;
        let text = msg.text.as_deref().unwrap_or("");

        if text.starts_with("/start") {
            let reply = if self.api_key(user_id).await.is_some() {
                "🔗 Send A Link To Convert !".to_string()
            } else {
                self.welcome(from.first_name.as_deref().unwrap_or("User"))
            };
            self.reply(chat_id, &reply).await;
            return Outcome::Command;
        }

        if text.starts_with("/help") {
            self.reply(
                chat_id,
                &format!("Hii For Any Query Contact Support - {SUPPORT_HANDLE}"),
            )
            .await;
            return Outcome::Command;
        }

        if text.starts_with("/set_api") {
            match text.split_whitespace().nth(1) {
                Some(api_key) => {
                    if let Err(e) = self.store.save_api_key(user_id, api_key.trim()).await {
                        tracing::error!("failed to save API key for user {}: {}", user_id, e);
                    }
                    self.reply(chat_id, "✅ API Key Saved Successfully!").await;
                }
                None => {
                    self.reply(chat_id, "❌ Correct usage: /set_api <API_KEY>")
                        .await;
                }
            }
            return Outcome::Command;
        }

        let Some(api_key) = self.api_key(user_id).await else {
            self.reply(
                chat_id,
                "❌ Please set your API key first:\n/set_api <API_KEY>",
            )
            .await;
            return Outcome::MissingApiKey;
        };

        let mut urls = extract_urls(text);
        let media = msg.media();
        if media.is_some() {
            let caption_urls = extract_urls(msg.caption.as_deref().unwrap_or(""));
            if !caption_urls.is_empty() {
                urls = caption_urls;
            }
        }

        if urls.is_empty() {
            self.reply(
                chat_id,
                &format!("❌ Please send a valid {} link.", self.domain),
            )
            .await;
            return Outcome::NoLinks;
        }

        let mut converted = Vec::with_capacity(urls.len());
        for url in urls {
            match self.convert(&api_key, &url).await {
                Ok(short_url) => converted.push(short_url),
                Err(reason) => {
                    self.reply(chat_id, &self.rejection(reason, &url)).await;
                    return Outcome::Rejected { url, reason };
                }
            }
        }

        let response = converted
            .iter()
            .map(|link| format!("✅Video Link\n{link}"))
            .collect::<Vec<_>>()
            .join("\n");

        match media {
            Some((kind, file_id)) => {
                if let Err(e) = self
                    .bot
                    .send_media(chat_id, kind, file_id, Some(&response))
                    .await
                {
                    tracing::error!("failed to send {:?} to chat {}: {}", kind, chat_id, e);
                }
            }
            None => self.reply(chat_id, &response).await,
        }

        tracing::info!("converted {} link(s) for user {}", converted.len(), user_id);
        Outcome::Converted(converted)
    }

    async fn convert(&self, api_key: &str, url: &str) -> Result<String, RejectReason> {
        if !is_domain_link(url, &self.domain) {
            return Err(RejectReason::ForeignDomain);
        }

        let long_url = match self.store.find_long_url(url).await {
            Ok(Some(long_url)) => long_url,
            Ok(None) => return Err(RejectReason::UnknownLink),
            Err(e) => {
                tracing::error!("failed to look up {}: {}", url, e);
                return Err(RejectReason::UnknownLink);
            }
        };

        let short_url = match self.shortener.shorten(api_key, &long_url).await {
            Ok(Some(short_url)) => short_url,
            Ok(None) => return Err(RejectReason::ShortenFailed),
            Err(e) => {
                tracing::warn!("shortening {} failed: {}", long_url, e);
                return Err(RejectReason::ShortenFailed);
            }
        };

        if let Err(e) = self.store.save_converted(&long_url, &short_url).await {
            tracing::error!("failed to record converted link {}: {}", short_url, e);
        }

        Ok(short_url)
    }

    async fn api_key(&self, user_id: i64) -> Option<String> {
        match self.store.get_api_key(user_id).await {
            Ok(key) => key,
            Err(e) => {
                tracing::error!("failed to read API key for user {}: {}", user_id, e);
                None
            }
        }
    }

    async fn reply(&self, chat_id: i64, text: &str) {
        if let Err(e) = self.bot.send_message(chat_id, text).await {
            tracing::error!("failed to send message to chat {}: {}", chat_id, e);
        }
    }

    fn rejection(&self, reason: RejectReason, url: &str) -> String {
        match reason {
            RejectReason::ForeignDomain => format!(
                "❌ Only {} links are supported! (Invalid: {url})",
                self.domain
            ),
            RejectReason::UnknownLink => {
                format!("❌ This link does not exist in database. ({url})")
            }
            RejectReason::ShortenFailed => {
                format!("❌ Failed to convert link using your API key. ({url})")
            }
        }
    }

    fn welcome(&self, name: &str) -> String {
        let domain = &self.domain;
        format!(
            "👋 Welcome {name} to {domain} Bot!\n\n\
             I am Link Converter Bot.\n\n\
             1️⃣ Create an Account on {domain}\n\
             2️⃣ Go To 👉 https://{domain}/member/tools/api\n\
             3️⃣ Copy your API Key\n\
             4️⃣ Send /set_api <API_KEY>\n\
             5️⃣ Send me any {domain} link\n\n\
             /set_api - Save your API Key\n\
             /help - Support - {SUPPORT_HANDLE}"
        )
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::store::MemoryLinkStore;
    use crate::telegram::{MediaKind, Update};
    use crate::{ConverterError, ConverterResult};
    use async_trait::async_trait;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    #[derive(Clone, Debug, PartialEq)]
    pub enum Sent {
        Text(i64, String),
        Media(i64, MediaKind, String, Option<String>),
    }

    #[derive(Default)]
    pub struct RecordingBot {
        pub sent: Mutex<Vec<Sent>>,
    }

    impl RecordingBot {
        pub fn sent(&self) -> Vec<Sent> {
            self.sent.lock().unwrap().clone()
        }

        pub fn texts(&self) -> Vec<String> {
            self.sent()
                .into_iter()
                .filter_map(|s| match s {
                    Sent::Text(_, text) => Some(text),
                    Sent::Media(..) => None,
                })
                .collect()
        }
    }

    #[async_trait]
    impl BotApi for RecordingBot {
        async fn get_updates(
            &self,
            _offset: Option<i64>,
            _timeout: Duration,
        ) -> ConverterResult<Vec<Update>> {
            Ok(Vec::new())
        }

        async fn send_message(&self, chat_id: i64, text: &str) -> ConverterResult<()> {
            self.sent
                .lock()
                .unwrap()
                .push(Sent::Text(chat_id, text.to_string()));
            Ok(())
        }

        async fn send_media(
            &self,
            chat_id: i64,
            kind: MediaKind,
            file_id: &str,
            caption: Option<&str>,
        ) -> ConverterResult<()> {
            self.sent.lock().unwrap().push(Sent::Media(
                chat_id,
                kind,
                file_id.to_string(),
                caption.map(str::to_string),
            ));
            Ok(())
        }
    }

    /// Maps `(api_key, long_url)` to a short URL; anything else is declined.
    #[derive(Default)]
    pub struct TableShortener {
        pub table: HashMap<(String, String), String>,
        pub fail_with_error: bool,
    }

    impl TableShortener {
        pub fn with(entries: &[(&str, &str, &str)]) -> Self {
            Self {
                table: entries
                    .iter()
                    .map(|(k, l, s)| ((k.to_string(), l.to_string()), s.to_string()))
                    .collect(),
                fail_with_error: false,
            }
        }
    }

    #[async_trait]
    impl Shortener for TableShortener {
        async fn shorten(&self, api_key: &str, long_url: &str) -> ConverterResult<Option<String>> {
            if self.fail_with_error {
                return Err(ConverterError::Config("shortener unavailable".into()));
            }
            Ok(self
                .table
                .get(&(api_key.to_string(), long_url.to_string()))
                .cloned())
        }
    }

    struct Fixture {
        bot: Arc<RecordingBot>,
        store: Arc<MemoryLinkStore>,
        handler: ConverterBot,
    }

    fn fixture(shortener: TableShortener) -> Fixture {
        let bot = Arc::new(RecordingBot::default());
        let store = Arc::new(MemoryLinkStore::with_links([
            ("https://viralbox.in/a1", "https://long.example/one"),
            ("https://viralbox.in/b2", "https://long.example/two"),
        ]));
        let handler = ConverterBot::new(
            bot.clone(),
            Arc::new(shortener),
            store.clone(),
            "viralbox.in",
        );
        Fixture {
            bot,
            store,
            handler,
        }
    }

    fn default_shortener() -> TableShortener {
        TableShortener::with(&[
            ("key-1", "https://long.example/one", "https://viralbox.in/mine1"),
            ("key-1", "https://long.example/two", "https://viralbox.in/mine2"),
        ])
    }

    fn message(value: serde_json::Value) -> Message {
        serde_json::from_value(value).expect("message should deserialize")
    }

    fn text_from(user_id: i64, text: &str) -> Message {
        message(json!({
            "chat": {"id": 900},
            "from": {"id": user_id, "first_name": "Ravi"},
            "text": text
        }))
    }

    #[tokio::test]
    async fn start_without_key_sends_welcome() {
        let fx = fixture(default_shortener());

        let outcome = fx.handler.process_message(&text_from(1, "/start")).await;

        assert_eq!(outcome, Outcome::Command);
        let texts = fx.bot.texts();
        assert_eq!(texts.len(), 1);
        assert!(texts[0].starts_with("👋 Welcome Ravi to viralbox.in Bot!"));
        assert!(texts[0].contains("https://viralbox.in/member/tools/api"));
        assert!(texts[0].ends_with("/help - Support - @viralbox_support"));
    }

    #[tokio::test]
    async fn start_without_first_name_uses_default() {
        let fx = fixture(default_shortener());
        let msg = message(json!({"chat": {"id": 3}, "from": {"id": 1}, "text": "/start"}));

        fx.handler.process_message(&msg).await;

        assert!(fx.bot.texts()[0].starts_with("👋 Welcome User to"));
    }

    #[tokio::test]
    async fn start_with_key_prompts_for_link() {
        let fx = fixture(default_shortener());
        fx.store.save_api_key(1, "key-1").await.unwrap();

        fx.handler.process_message(&text_from(1, "/start")).await;

        assert_eq!(fx.bot.texts(), vec!["🔗 Send A Link To Convert !"]);
    }

    #[tokio::test]
    async fn help_points_to_support() {
        let fx = fixture(default_shortener());

        fx.handler.process_message(&text_from(1, "/help me")).await;

        assert_eq!(
            fx.bot.texts(),
            vec!["Hii For Any Query Contact Support - @viralbox_support"]
        );
    }

    #[tokio::test]
    async fn set_api_saves_key() {
        let fx = fixture(default_shortener());

        let outcome = fx
            .handler
            .process_message(&text_from(5, "/set_api   abc123  extra"))
            .await;

        assert_eq!(outcome, Outcome::Command);
        assert_eq!(fx.bot.texts(), vec!["✅ API Key Saved Successfully!"]);
        assert_eq!(fx.store.get_api_key(5).await.unwrap().as_deref(), Some("abc123"));
    }

    #[tokio::test]
    async fn set_api_without_key_shows_usage() {
        let fx = fixture(default_shortener());

        fx.handler.process_message(&text_from(5, "/set_api")).await;

        assert_eq!(fx.bot.texts(), vec!["❌ Correct usage: /set_api <API_KEY>"]);
        assert_eq!(fx.store.get_api_key(5).await.unwrap(), None);
    }

    #[tokio::test]
    async fn links_require_an_api_key() {
        let fx = fixture(default_shortener());

        let outcome = fx
            .handler
            .process_message(&text_from(1, "https://viralbox.in/a1"))
            .await;

        assert_eq!(outcome, Outcome::MissingApiKey);
        assert_eq!(
            fx.bot.texts(),
            vec!["❌ Please set your API key first:\n/set_api <API_KEY>"]
        );
    }

    #[tokio::test]
    async fn text_without_links_is_rejected() {
        let fx = fixture(default_shortener());
        fx.store.save_api_key(1, "key-1").await.unwrap();

        let outcome = fx.handler.process_message(&text_from(1, "hello")).await;

        assert_eq!(outcome, Outcome::NoLinks);
        assert_eq!(fx.bot.texts(), vec!["❌ Please send a valid viralbox.in link."]);
    }

    #[tokio::test]
    async fn converts_every_link_in_order() {
        let fx = fixture(default_shortener());
        fx.store.save_api_key(1, "key-1").await.unwrap();

        let outcome = fx
            .handler
            .process_message(&text_from(
                1,
                "two links https://viralbox.in/a1 and https://viralbox.in/b2",
            ))
            .await;

        assert_eq!(
            outcome,
            Outcome::Converted(vec![
                "https://viralbox.in/mine1".into(),
                "https://viralbox.in/mine2".into()
            ])
        );
        assert_eq!(
            fx.bot.sent(),
            vec![Sent::Text(
                900,
                "✅Video Link\nhttps://viralbox.in/mine1\n✅Video Link\nhttps://viralbox.in/mine2"
                    .into()
            )]
        );

        let links = fx.store.links().await;
        assert_eq!(links.len(), 4);
        assert_eq!(links[2].long_url, "https://long.example/one");
        assert_eq!(links[2].short_url, "https://viralbox.in/mine1");
    }

    #[tokio::test]
    async fn foreign_domain_stops_processing() {
        let fx = fixture(default_shortener());
        fx.store.save_api_key(1, "key-1").await.unwrap();

        let outcome = fx
            .handler
            .process_message(&text_from(
                1,
                "https://other.site/x https://viralbox.in/a1",
            ))
            .await;

        assert_eq!(
            outcome,
            Outcome::Rejected {
                url: "https://other.site/x".into(),
                reason: RejectReason::ForeignDomain
            }
        );
        assert_eq!(
            fx.bot.texts(),
            vec!["❌ Only viralbox.in links are supported! (Invalid: https://other.site/x)"]
        );
        assert_eq!(fx.store.links().await.len(), 2);
    }

    #[tokio::test]
    async fn unknown_link_is_reported() {
        let fx = fixture(default_shortener());
        fx.store.save_api_key(1, "key-1").await.unwrap();

        fx.handler
            .process_message(&text_from(1, "https://viralbox.in/nope"))
            .await;

        assert_eq!(
            fx.bot.texts(),
            vec!["❌ This link does not exist in database. (https://viralbox.in/nope)"]
        );
    }

    #[tokio::test]
    async fn partial_failure_sends_only_the_error() {
        let fx = fixture(TableShortener::with(&[(
            "key-1",
            "https://long.example/one",
            "https://viralbox.in/mine1",
        )]));
        fx.store.save_api_key(1, "key-1").await.unwrap();

        let outcome = fx
            .handler
            .process_message(&text_from(
                1,
                "https://viralbox.in/a1 https://viralbox.in/b2",
            ))
            .await;

        assert_eq!(
            outcome,
            Outcome::Rejected {
                url: "https://viralbox.in/b2".into(),
                reason: RejectReason::ShortenFailed
            }
        );
        assert_eq!(
            fx.bot.texts(),
            vec!["❌ Failed to convert link using your API key. (https://viralbox.in/b2)"]
        );
        // The first link was already converted and recorded.
        assert_eq!(fx.store.links().await.len(), 3);
    }

    #[tokio::test]
    async fn shortener_error_is_reported_as_failure() {
        let mut shortener = default_shortener();
        shortener.fail_with_error = true;
        let fx = fixture(shortener);
        fx.store.save_api_key(1, "key-1").await.unwrap();

        let outcome = fx
            .handler
            .process_message(&text_from(1, "https://viralbox.in/a1"))
            .await;

        assert!(matches!(
            outcome,
            Outcome::Rejected {
                reason: RejectReason::ShortenFailed,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn media_caption_links_are_sent_back_with_media() {
        let fx = fixture(default_shortener());
        fx.store.save_api_key(1, "key-1").await.unwrap();
        let msg = message(json!({
            "chat": {"id": 900},
            "from": {"id": 1},
            "photo": [{"file_id": "thumb"}, {"file_id": "full"}],
            "caption": "watch https://viralbox.in/b2"
        }));

        fx.handler.process_message(&msg).await;

        assert_eq!(
            fx.bot.sent(),
            vec![Sent::Media(
                900,
                MediaKind::Photo,
                "full".into(),
                Some("✅Video Link\nhttps://viralbox.in/mine2".into())
            )]
        );
    }

    #[tokio::test]
    async fn media_without_caption_links_is_rejected() {
        let fx = fixture(default_shortener());
        fx.store.save_api_key(1, "key-1").await.unwrap();
        let msg = message(json!({
            "chat": {"id": 900},
            "from": {"id": 1},
            "video": {"file_id": "v1"},
            "caption": "no links"
        }));

        let outcome = fx.handler.process_message(&msg).await;

        assert_eq!(outcome, Outcome::NoLinks);
    }

    #[tokio::test]
    async fn message_without_sender_is_ignored() {
        let fx = fixture(default_shortener());
        let msg = message(json!({"chat": {"id": -100}, "text": "/start"}));

        assert_eq!(fx.handler.process_message(&msg).await, Outcome::Ignored);
        assert!(fx.bot.sent().is_empty());
    }
}
