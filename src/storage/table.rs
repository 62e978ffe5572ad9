//! In-memory link table shared by the memory and file backends

use std::collections::{HashMap, VecDeque};

use chrono::{DateTime, Utc};

use super::StoreOptions;
use super::models::{ClickMark, ShortUrlRecord, StoreSnapshot};
use crate::analytics::{ClickEvent, TopLink, push_recent_click, ranking};

pub(crate) struct LinkTable {
    links: HashMap<String, ShortUrlRecord>,
    /// 全局点击时间线，超过保留期的条目从队首丢弃
    clicks: VecDeque<ClickMark>,
    counter: u64,
    options: StoreOptions,
}

impl LinkTable {
    pub fn new(options: StoreOptions) -> Self {
        Self {
            links: HashMap::new(),
            clicks: VecDeque::new(),
            counter: 0,
            options,
        }
    }

    pub fn from_snapshot(snapshot: StoreSnapshot, options: StoreOptions) -> Self {
        let links = snapshot
            .links
            .into_iter()
            .map(|record| (record.short_code.clone(), record))
            .collect();
        let mut table = Self {
            links,
            clicks: snapshot.clicks.into(),
            counter: snapshot.counter,
            options,
        };
        table.prune_clicks(Utc::now());
        table
    }

    pub fn to_snapshot(&self) -> StoreSnapshot {
        let mut links: Vec<ShortUrlRecord> = self.links.values().cloned().collect();
        links.sort_by(|a, b| {
            a.created_at
                .cmp(&b.created_at)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });
        StoreSnapshot {
            counter: self.counter,
            links,
            clicks: self.clicks.iter().cloned().collect(),
        }
    }

    /// Insert if the code is free. Returns `false` on a taken code.
    pub fn insert(&mut self, record: ShortUrlRecord) -> bool {
        if self.links.contains_key(&record.short_code) {
            return false;
        }
        self.links.insert(record.short_code.clone(), record);
        true
    }

    pub fn get(&self, short_code: &str) -> Option<ShortUrlRecord> {
        self.links.get(short_code).cloned()
    }

    pub fn contains(&self, short_code: &str) -> bool {
        self.links.contains_key(short_code)
    }

    /// Oldest generated (non-alias) record pointing at `original_url`.
    pub fn find_by_url(&self, original_url: &str) -> Option<ShortUrlRecord> {
        self.links
            .values()
            .filter(|r| !r.is_alias() && r.original_url == original_url)
            .min_by(|a, b| {
                a.created_at
                    .cmp(&b.created_at)
                    .then_with(|| a.short_code.cmp(&b.short_code))
            })
            .cloned()
    }

    pub fn record_click(&mut self, short_code: &str, event: ClickEvent) -> Option<u64> {
        let record = self.links.get_mut(short_code)?;
        record.click_count += 1;
        record.last_accessed = Some(event.timestamp);
        let timestamp = event.timestamp;
        push_recent_click(&mut record.recent_clicks, event, self.options.recent_clicks_cap);
        let count = record.click_count;

        self.clicks.push_back(ClickMark {
            short_code: short_code.to_string(),
            timestamp,
        });
        self.prune_clicks(Utc::now());
        Some(count)
    }

    /// Remove a record together with its click history.
    pub fn remove(&mut self, short_code: &str) -> bool {
        if self.links.remove(short_code).is_none() {
            return false;
        }
        self.clicks.retain(|mark| mark.short_code != short_code);
        true
    }

    /// Newest first.
    pub fn list(&self, limit: usize) -> Vec<ShortUrlRecord> {
        let mut records: Vec<&ShortUrlRecord> = self.links.values().collect();
        records.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| a.short_code.cmp(&b.short_code))
        });
        records.into_iter().take(limit).cloned().collect()
    }

    pub fn len(&self) -> u64 {
        self.links.len() as u64
    }

    pub fn total_clicks(&self) -> u64 {
        self.links.values().map(|r| r.click_count).sum()
    }

    pub fn clicks_since(&self, since: DateTime<Utc>) -> u64 {
        self.clicks.iter().filter(|m| m.timestamp >= since).count() as u64
    }

    pub fn top_by_clicks(&self, n: usize) -> Vec<TopLink> {
        ranking::top_n(self.links.values(), n)
    }

    /// Seed for the code generator: the persisted high-water mark, or the
    /// record count when the mark was never written.
    pub fn counter_seed(&self) -> u64 {
        self.counter.max(self.len())
    }

    /// Raise the high-water mark. Never lowers it.
    pub fn advance_counter(&mut self, value: u64) -> bool {
        if value > self.counter {
            self.counter = value;
            true
        } else {
            false
        }
    }

    fn prune_clicks(&mut self, now: DateTime<Utc>) {
        let Some(cutoff) = now.checked_sub_signed(self.options.click_retention) else {
            return;
        };
        while self.clicks.front().is_some_and(|m| m.timestamp < cutoff) {
            self.clicks.pop_front();
        }
    }
}
