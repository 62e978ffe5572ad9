use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use tracing::{error, info};

use super::table::LinkTable;
use super::{ShortUrlRecord, Store, StoreOptions, StoreSnapshot};
use crate::analytics::{ClickEvent, ClickLedger, TopLink};
use crate::errors::{Result, SnaplinkError};

/// JSON 文件存储
///
/// 内存中保存完整数据，每次变更后整体重写快照文件（先写临时文件再 rename）。
/// 快照包含代码生成器的高水位，重启后不会复用已发出的短码。
pub struct FileStore {
    file_path: PathBuf,
    table: RwLock<LinkTable>,
}

impl FileStore {
    /// Load `file_path`, creating an empty snapshot when it does not exist.
    pub fn open(file_path: impl AsRef<Path>, options: StoreOptions) -> Result<Self> {
        let file_path = file_path.as_ref().to_path_buf();
        let snapshot = Self::load_from_file(&file_path)?;
        let table = LinkTable::from_snapshot(snapshot, options);
        info!(
            "FileStore 初始化完成，已加载 {} 个短链接 ({})",
            table.len(),
            file_path.display()
        );

        let store = Self {
            file_path,
            table: RwLock::new(table),
        };
        store.save_to_file(&store.table.read())?;
        Ok(store)
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn load_from_file(path: &Path) -> Result<StoreSnapshot> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                info!("链接文件不存在，创建空的存储: {}", path.display());
                return Ok(StoreSnapshot::default());
            }
            Err(e) => {
                error!("读取链接文件失败: {}", e);
                return Err(SnaplinkError::file_operation(format!(
                    "读取链接文件失败 {}: {}",
                    path.display(),
                    e
                )));
            }
        };

        if content.trim().is_empty() {
            return Ok(StoreSnapshot::default());
        }

        serde_json::from_str(&content).map_err(|e| {
            error!("解析链接文件失败: {}", e);
            SnaplinkError::serialization(format!("解析链接文件失败: {}", e))
        })
    }

    fn save_to_file(&self, table: &LinkTable) -> Result<()> {
        let json = serde_json::to_string_pretty(&table.to_snapshot())?;

        if let Some(parent) = self.file_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)?;
        }

        let tmp_path = self.file_path.with_extension("json.tmp");
        fs::write(&tmp_path, json).map_err(|e| {
            error!("写入链接文件失败: {}", e);
            SnaplinkError::file_operation(format!("写入链接文件失败: {}", e))
        })?;
        fs::rename(&tmp_path, &self.file_path)?;
        Ok(())
    }

    /// Apply `mutate` and persist under the same write lock, so snapshots hit
    /// the disk in mutation order.
    fn mutate<T>(&self, mutate: impl FnOnce(&mut LinkTable) -> (T, bool)) -> Result<T> {
        let mut table = self.table.write();
        let (out, changed) = mutate(&mut table);
        if changed {
            self.save_to_file(&table)?;
        }
        Ok(out)
    }
}

#[async_trait::async_trait]
impl ClickLedger for FileStore {
    async fn record_click(&self, short_code: &str, event: ClickEvent) -> Result<Option<u64>> {
        self.mutate(|table| {
            let count = table.record_click(short_code, event);
            (count, count.is_some())
        })
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
impl Store for FileStore {
    async fn insert(&self, record: ShortUrlRecord) -> Result<bool> {
        self.mutate(|table| {
            let inserted = table.insert(record);
            (inserted, inserted)
        })
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
        self.mutate(|table| {
            let removed = table.remove(short_code);
            (removed, removed)
        })
    }

    async fn list(&self, limit: usize) -> Result<Vec<ShortUrlRecord>> {
        Ok(self.table.read().list(limit))
    }

    async fn load_counter(&self) -> Result<u64> {
        Ok(self.table.read().counter_seed())
    }

    async fn advance_counter(&self, value: u64) -> Result<()> {
        self.mutate(|table| ((), table.advance_counter(value)))
    }

    fn backend_name(&self) -> &'static str {
        "file"
    }
}
