use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::{debug, trace};

use super::{ClickEvent, ClickLedger, TopLink};
use crate::config::AnalyticsConfig;
use crate::errors::Result;

/// 聚合统计结果
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalyticsSummary {
    pub total_urls: u64,
    pub total_clicks: u64,
    /// Clicks inside the trailing window.
    pub recent_clicks: u64,
    pub recent_window_secs: u64,
    pub top_urls: Vec<TopLink>,
}

/// Click recording and on-demand aggregation over a `ClickLedger`.
pub struct ClickAggregator {
    ledger: Arc<dyn ClickLedger>,
    top_n: usize,
    window: Duration,
    window_secs: u64,
}

impl ClickAggregator {
    pub fn new(ledger: Arc<dyn ClickLedger>, config: &AnalyticsConfig) -> Self {
        let window_secs = config.recent_window_secs;
        Self {
            ledger,
            top_n: config.top_n,
            window: i64::try_from(window_secs)
                .ok()
                .and_then(Duration::try_seconds)
                .unwrap_or(Duration::MAX),
            window_secs,
        }
    }

    pub fn top_n(&self) -> usize {
        self.top_n
    }

    /// Record one click. `None` means the code vanished between lookup and
    /// recording (a concurrent delete); the click is dropped.
    pub async fn record(&self, short_code: &str, event: ClickEvent) -> Result<Option<u64>> {
        let count = self.ledger.record_click(short_code, event).await?;
        match count {
            Some(n) => trace!("ClickAggregator: '{}' now at {} clicks", short_code, n),
            None => debug!("ClickAggregator: dropped click for missing code '{}'", short_code),
        }
        Ok(count)
    }

    pub async fn summary(&self) -> Result<AnalyticsSummary> {
        self.summary_at(Utc::now()).await
    }

    /// Aggregates as of `now`.
    pub async fn summary_at(&self, now: DateTime<Utc>) -> Result<AnalyticsSummary> {
        let since = now.checked_sub_signed(self.window).unwrap_or(DateTime::<Utc>::MIN_UTC);

        Ok(AnalyticsSummary {
            total_urls: self.ledger.total_links().await?,
            total_clicks: self.ledger.total_clicks().await?,
            recent_clicks: self.ledger.clicks_since(since).await?,
            recent_window_secs: self.window_secs,
            top_urls: self.ledger.top_by_clicks(self.top_n).await?,
        })
    }
}
