use chrono::{DateTime, Utc};
use parking_lot::RwLock;

use super::table::LinkTable;
use super::{ShortUrlRecord, Store, StoreOptions};
use crate::analytics::{ClickEvent, ClickLedger, TopLink};
use crate::errors::Result;

/// 进程内存储，进程退出即丢失
pub struct MemoryStore {
    table: RwLock<LinkTable>,
}

impl MemoryStore {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            table: RwLock::new(LinkTable::new(options)),
        }
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(StoreOptions::default())
    }
}

#[async_trait::async_trait]
impl ClickLedger for MemoryStore {
    async fn record_click(&self, short_code: &str, event: ClickEvent) -> Result<Option<u64>> {
        Ok(self.table.write().record_click(short_code, event))
    }

    async fn total_links(&self) -> Result<u64> {
        Ok(self.table.read().len())
    }

    async fn total_clicks(&self) -> Result<u64> {
        Ok(self.table.read().total_clicks())
    }

    async fn clicks_since(&self, since: DateTime<Utc>) -> Result<u64> {
        Ok(self.table.read().clicks_since(since))
    }

    async fn top_by_clicks(&self, n: usize) -> Result<Vec<TopLink>> {
        Ok(self.table.read().top_by_clicks(n))
    }
}

#[async_trait::async_trait]
impl Store for MemoryStore {
    async fn insert(&self, record: ShortUrlRecord) -> Result<bool> {
        Ok(self.table.write().insert(record))
    }

    async fn get(&self, short_code: &str) -> Result<Option<ShortUrlRecord>> {
        Ok(self.table.read().get(short_code))
    }

    async fn exists(&self, short_code: &str) -> Result<bool> {
        Ok(self.table.read().contains(short_code))
    }

    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>> {
        Ok(self.table.read().find_by_url(original_url))
    }

    async fn remove(&self, short_code: &str) -> Result<bool> {
        Ok(self.table.write().remove(short_code))
    }

    async fn list(&self, limit: usize) -> Result<Vec<ShortUrlRecord>> {
        Ok(self.table.read().list(limit))
    }

    async fn load_counter(&self) -> Result<u64> {
        Ok(self.table.read().counter_seed())
    }

    async fn advance_counter(&self, value: u64) -> Result<()> {
        self.table.write().advance_counter(value);
        Ok(())
    }

    fn backend_name(&self) -> &'static str {
        "memory"
    }
}
