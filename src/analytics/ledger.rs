use chrono::{DateTime, Utc};

use super::{ClickEvent, TopLink};
use crate::errors::Result;

/// 点击数据的读写契约，由存储后端实现
///
/// Backends apply `push_recent_click` for the per-link log and `rank_order`
/// for `top_by_clicks`, so every backend truncates and ranks the same way.
#[async_trait::async_trait]
pub trait ClickLedger: Send + Sync {
    /// Increment `click_count`, append to the recent-click log and set
    /// `last_accessed`. Returns the new click count, or `None` when the code
    /// does not exist.
    async fn record_click(&self, short_code: &str, event: ClickEvent) -> Result<Option<u64>>;

    async fn total_links(&self) -> Result<u64>;

    async fn total_clicks(&self) -> Result<u64>;

    /// Clicks recorded at or after `since`, across all links.
    async fn clicks_since(&self, since: DateTime<Utc>) -> Result<u64>;

    async fn top_by_clicks(&self, n: usize) -> Result<Vec<TopLink>>;
}
