use super::{LinkRecord, LinkStore, UserApiRecord};
use crate::config::MongoConfig;
use crate::constants::{LINKS_COLLECTION, USER_APIS_COLLECTION};
use crate::ConverterResult;
use async_trait::async_trait;
use mongodb::bson::doc;
use mongodb::options::ClientOptions;
use mongodb::{Client, Collection};

/// MongoDB-backed store.
///
/// Documents use the `userId`/`apiKey` and `longURL`/`shortURL` field names so existing
/// collections can be read as-is.
#[derive(Clone)]
pub struct MongoLinkStore {
    links: Collection<LinkRecord>,
    user_apis: Collection<UserApiRecord>,
}

impl MongoLinkStore {
    /// Connect using `cfg` and verify the server responds.
    ///
    /// # Errors
    /// Returns `ConverterError::Database` if the URI is invalid or the ping fails.
    pub async fn connect(cfg: &MongoConfig) -> ConverterResult<Self> {
        let mut options = ClientOptions::parse(cfg.uri()).await?;
        options.max_pool_size = Some(cfg.max_pool_size());
        options.app_name = Some("converter".into());

        let client = Client::with_options(options)?;
        let db = client.database(cfg.db_name());
        db.run_command(doc! { "ping": 1 }).await?;
        tracing::info!("connected to MongoDB database {}", cfg.db_name());

        Ok(Self {
            links: db.collection(LINKS_COLLECTION),
            user_apis: db.collection(USER_APIS_COLLECTION),
        })
    }
}

#[async_trait]
impl LinkStore for MongoLinkStore {
    async fn save_api_key(&self, user_id: i64, api_key: &str) -> ConverterResult<()> {
        self.user_apis
            .update_one(
                doc! { "userId": user_id },
                doc! { "$set": { "userId": user_id, "apiKey": api_key } },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn get_api_key(&self, user_id: i64) -> ConverterResult<Option<String>> {
        let record = self.user_apis.find_one(doc! { "userId": user_id }).await?;
        Ok(record.map(|r| r.api_key))
    }

    async fn save_converted(&self, long_url: &str, short_url: &str) -> ConverterResult<()> {
        let record = LinkRecord {
            long_url: long_url.to_string(),
            short_url: short_url.to_string(),
        };
        self.links.insert_one(record).await?;
        Ok(())
    }

    async fn find_long_url(&self, short_url: &str) -> ConverterResult<Option<String>> {
        let record = self.links.find_one(doc! { "shortURL": short_url }).await?;
        Ok(record.map(|r| r.long_url))
    }
}
