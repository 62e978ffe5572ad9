use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::analytics::ClickEvent;

/// 短链接记录
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShortUrlRecord {
    pub short_code: String,
    pub original_url: String,
    /// 自定义别名；存在时与 short_code 相同
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_alias: Option<String>,
    pub created_at: DateTime<Utc>,

    #[serde(default)]
    pub click_count: u64,
    #[serde(default)]
    pub last_accessed: Option<DateTime<Utc>>,
    /// Most recent last, bounded by `analytics.recent_clicks_cap`.
    #[serde(default)]
    pub recent_clicks: VecDeque<ClickEvent>,
}

impl ShortUrlRecord {
    pub fn new(
        short_code: impl Into<String>,
        original_url: impl Into<String>,
        custom_alias: Option<String>,
    ) -> Self {
        Self {
            short_code: short_code.into(),
            original_url: original_url.into(),
            custom_alias,
            created_at: Utc::now(),
            click_count: 0,
            last_accessed: None,
            recent_clicks: VecDeque::new(),
        }
    }

    pub fn is_alias(&self) -> bool {
        self.custom_alias.is_some()
    }
}

/// 统计视图：最近点击按时间倒序
#[derive(Debug, Clone, Serialize)]
pub struct LinkStats {
    pub short_code: String,
    pub original_url: String,
    pub custom_alias: Option<String>,
    pub created_at: DateTime<Utc>,
    pub click_count: u64,
    pub last_accessed: Option<DateTime<Utc>>,
    pub recent_clicks: Vec<ClickEvent>,
}

impl From<ShortUrlRecord> for LinkStats {
    fn from(record: ShortUrlRecord) -> Self {
        Self {
            short_code: record.short_code,
            original_url: record.original_url,
            custom_alias: record.custom_alias,
            created_at: record.created_at,
            click_count: record.click_count,
            last_accessed: record.last_accessed,
            recent_clicks: record.recent_clicks.into_iter().rev().collect(),
        }
    }
}

/// One entry of the store-wide click timeline used for windowed counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickMark {
    pub short_code: String,
    pub timestamp: DateTime<Utc>,
}

/// On-disk layout of the file backend.
#[derive(Debug, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Code generator high-water mark.
    #[serde(default)]
    pub counter: u64,
    #[serde(default)]
    pub links: Vec<ShortUrlRecord>,
    #[serde(default)]
    pub clicks: Vec<ClickMark>,
}
