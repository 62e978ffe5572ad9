use std::sync::Arc;

use chrono::Duration;
use tracing::info;

use crate::analytics::ClickLedger;
use crate::config::{AnalyticsConfig, StorageConfig};
use crate::errors::{Result, SnaplinkError};

pub mod file;
pub mod memory;
pub mod models;
mod table;

pub use file::FileStore;
pub use memory::MemoryStore;
pub use models::{ClickMark, LinkStats, ShortUrlRecord, StoreSnapshot};

/// Persistent store for short links.
///
/// Click recording and aggregate reads come from the `ClickLedger` supertrait.
#[async_trait::async_trait]
pub trait Store: ClickLedger {
    /// Insert `record` if its code is free. Returns `false` when taken.
    async fn insert(&self, record: ShortUrlRecord) -> Result<bool>;

    async fn get(&self, short_code: &str) -> Result<Option<ShortUrlRecord>>;

    async fn exists(&self, short_code: &str) -> Result<bool>;

    /// Existing generated (non-alias) record for `original_url`.
    async fn find_by_url(&self, original_url: &str) -> Result<Option<ShortUrlRecord>>;

    /// Delete a record and its click history. Returns `false` when absent.
    async fn remove(&self, short_code: &str) -> Result<bool>;

    /// Up to `limit` records, newest first.
    async fn list(&self, limit: usize) -> Result<Vec<ShortUrlRecord>>;

    /// Code generator seed: `max(high-water mark, record count)`.
    async fn load_counter(&self) -> Result<u64>;

    /// Raise the persisted high-water mark to at least `value`.
    async fn advance_counter(&self, value: u64) -> Result<()>;

    fn backend_name(&self) -> &'static str;
}

/// 存储层选项，来自 analytics 配置
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// 每条记录保留的最近点击数
    pub recent_clicks_cap: usize,
    /// 全局点击时间线的保留时长
    pub click_retention: Duration,
}

impl StoreOptions {
    pub fn from_config(config: &AnalyticsConfig) -> Self {
        Self {
            recent_clicks_cap: config.recent_clicks_cap,
            click_retention: i64::try_from(config.recent_window_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
        }
    }
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self::from_config(&AnalyticsConfig::default())
    }
}

pub struct StorageFactory;

impl StorageFactory {
    pub fn create(config: &StorageConfig, options: StoreOptions) -> Result<Arc<dyn Store>> {
        let store: Arc<dyn Store> = match config.backend.as_str() {
            "memory" => Arc::new(MemoryStore::new(options)),
            "file" => Arc::new(FileStore::open(&config.file_path, options)?),
            other => {
                return Err(SnaplinkError::config(format!(
                    "Unknown storage backend '{}'. Supported: memory, file",
                    other
                )));
            }
        };
        info!("Storage backend: {}", store.backend_name());
        Ok(store)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_factory_memory() {
        let config = StorageConfig {
            backend: "memory".into(),
            file_path: String::new(),
        };
        let store = StorageFactory::create(&config, StoreOptions::default()).unwrap();
        assert_eq!(store.backend_name(), "memory");
    }

    #[test]
    fn test_factory_unknown_backend() {
        let config = StorageConfig {
            backend: "redis".into(),
            file_path: String::new(),
        };
        let err = StorageFactory::create(&config, StoreOptions::default()).err().unwrap();
        assert!(matches!(err, SnaplinkError::Config(_)));
    }

    #[test]
    fn test_options_follow_analytics_config() {
        let config = AnalyticsConfig {
            recent_clicks_cap: 7,
            recent_window_secs: 120,
            ..AnalyticsConfig::default()
        };
        let options = StoreOptions::from_config(&config);
        assert_eq!(options.recent_clicks_cap, 7);
        assert_eq!(options.click_retention, Duration::seconds(120));
    }
}
