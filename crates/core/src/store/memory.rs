use super::{LinkRecord, LinkStore};
use crate::ConverterResult;
use async_trait::async_trait;
use std::collections::HashMap;
use tokio::sync::RwLock;

/// In-process store with the same lookup semantics as the MongoDB store.
#[derive(Default)]
pub struct MemoryLinkStore {
    api_keys: RwLock<HashMap<i64, String>>,
    links: RwLock<Vec<LinkRecord>>,
}

impl MemoryLinkStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed the store with existing short-to-long mappings.
    pub fn with_links<'a>(links: impl IntoIterator<Item = (&'a str, &'a str)>) -> Self {
        let records = links
            .into_iter()
            .map(|(short_url, long_url)| LinkRecord {
                long_url: long_url.to_string(),
                short_url: short_url.to_string(),
            })
            .collect();
        Self {
            api_keys: RwLock::default(),
            links: RwLock::new(records),
        }
    }

    /// All link records in insertion order.
    pub async fn links(&self) -> Vec<LinkRecord> {
        self.links.read().await.clone()
    }
}

#[async_trait]
impl LinkStore for MemoryLinkStore {
    async fn save_api_key(&self, user_id: i64, api_key: &str) -> ConverterResult<()> {
        self.api_keys
            .write()
            .await
            .insert(user_id, api_key.to_string());
        Ok(())
    }

    async fn get_api_key(&self, user_id: i64) -> ConverterResult<Option<String>> {
        Ok(self.api_keys.read().await.get(&user_id).cloned())
    }

    async fn save_converted(&self, long_url: &str, short_url: &str) -> ConverterResult<()> {
        self.links.write().await.push(LinkRecord {
            long_url: long_url.to_string(),
            short_url: short_url.to_string(),
        });
        Ok(())
    }

    async fn find_long_url(&self, short_url: &str) -> ConverterResult<Option<String>> {
        Ok(self
            .links
            .read()
            .await
            .iter()
            .find(|r| r.short_url == short_url)
            .map(|r| r.long_url.clone()))
    }
}
