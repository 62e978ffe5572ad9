use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::storage::ShortUrlRecord;

/// 排行榜条目
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopLink {
    pub short_code: String,
    pub original_url: String,
    pub clicks: u64,
}

impl From<&ShortUrlRecord> for TopLink {
    fn from(record: &ShortUrlRecord) -> Self {
        Self {
            short_code: record.short_code.clone(),
            original_url: record.original_url.clone(),
            clicks: record.click_count,
        }
    }
}

/// Ranking order: most clicks first, then most recently created, then
/// `short_code` ascending so equal records always come out the same way.
pub fn rank_order(a: &ShortUrlRecord, b: &ShortUrlRecord) -> Ordering {
    b.click_count
        .cmp(&a.click_count)
        .then_with(|| b.created_at.cmp(&a.created_at))
        .then_with(|| a.short_code.cmp(&b.short_code))
}

/// Pick the top `n` records by `rank_order`.
pub fn top_n<'a, I>(records: I, n: usize) -> Vec<TopLink>
where
    I: IntoIterator<Item = &'a ShortUrlRecord>,
{
    let mut ranked: Vec<&ShortUrlRecord> = records.into_iter().collect();
    ranked.sort_by(|a, b| rank_order(a, b));
    ranked.into_iter().take(n).map(TopLink::from).collect()
}
