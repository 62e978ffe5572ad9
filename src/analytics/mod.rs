pub mod aggregator;
pub mod ledger;
pub mod ranking;
pub mod recent;

pub use aggregator::{AnalyticsSummary, ClickAggregator};
pub use ledger::ClickLedger;
pub use ranking::{TopLink, rank_order};
pub use recent::push_recent_click;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 单次点击事件，创建后不再修改
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClickEvent {
    /// 点击时间戳
    pub timestamp: DateTime<Utc>,
    /// 用户代理 (User-Agent header)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// 来源页面 (Referer header)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub referrer: Option<String>,
}

impl ClickEvent {
    pub fn new() -> Self {
        Self::at(Utc::now())
    }

    pub fn at(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            user_agent: None,
            referrer: None,
        }
    }

    pub fn with_headers(mut self, user_agent: Option<String>, referrer: Option<String>) -> Self {
        self.user_agent = user_agent;
        self.referrer = referrer;
        self
    }
}

impl Default for ClickEvent {
    fn default() -> Self {
        Self::new()
    }
}
