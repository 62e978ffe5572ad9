//! Storage backend tests
//!
//! Both backends share the same contract; the file backend must also survive
//! a reopen with its counter intact.

use std::sync::Arc;

use chrono::{Duration, Utc};
use snaplink::analytics::{ClickEvent, ClickLedger};
use snaplink::config::{StaticConfig, StorageConfig};
use snaplink::services::{CreateLinkRequest, LinkService, RequestContext};
use snaplink::storage::{
    FileStore, MemoryStore, ShortUrlRecord, StorageFactory, Store, StoreOptions,
};
use tempfile::TempDir;

// =============================================================================
// Helpers
// =============================================================================

fn record_at(code: &str, url: &str, age_secs: i64) -> ShortUrlRecord {
    let mut record = ShortUrlRecord::new(code, url, None);
    record.created_at = Utc::now() - Duration::seconds(age_secs);
    record
}

async fn exercise_contract(store: Arc<dyn Store>) {
    assert!(store.insert(record_at("a", "https://example.com/a", 30)).await.unwrap());
    assert!(store.insert(record_at("b", "https://example.com/b", 20)).await.unwrap());
    assert!(store.insert(record_at("c", "https://example.com/c", 10)).await.unwrap());
    assert!(!store.insert(record_at("a", "https://other.com", 0)).await.unwrap());

    assert!(store.exists("b").await.unwrap());
    assert!(!store.exists("zz").await.unwrap());
    assert_eq!(
        store.get("a").await.unwrap().unwrap().original_url,
        "https://example.com/a"
    );
    assert_eq!(
        store
            .find_by_url("https://example.com/b")
            .await
            .unwrap()
            .map(|r| r.short_code),
        Some("b".to_string())
    );

    let listed: Vec<_> = store
        .list(10)
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.short_code)
        .collect();
    assert_eq!(listed, vec!["c", "b", "a"]);

    for _ in 0..2 {
        store.record_click("a", ClickEvent::new()).await.unwrap();
    }
    store.record_click("b", ClickEvent::new()).await.unwrap();
    assert_eq!(store.record_click("zz", ClickEvent::new()).await.unwrap(), None);

    assert_eq!(store.total_links().await.unwrap(), 3);
    assert_eq!(store.total_clicks().await.unwrap(), 3);
    assert_eq!(
        store
            .clicks_since(Utc::now() - Duration::minutes(5))
            .await
            .unwrap(),
        3
    );

    let top = store.top_by_clicks(3).await.unwrap();
    let ranked: Vec<_> = top.iter().map(|t| t.short_code.as_str()).collect();
    // 按点击数降序，0 次点击的 c 排在最后
    assert_eq!(ranked, vec!["a", "b", "c"]);

    assert!(store.remove("a").await.unwrap());
    assert!(!store.remove("a").await.unwrap());
    assert_eq!(store.total_clicks().await.unwrap(), 1);
}

// =============================================================================
// Contract
// =============================================================================

#[tokio::test]
async fn test_memory_store_contract() {
    exercise_contract(Arc::new(MemoryStore::default())).await;
}

#[tokio::test]
async fn test_file_store_contract() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::open(dir.path().join("links.json"), StoreOptions::default()).unwrap();
    exercise_contract(Arc::new(store)).await;
}

#[tokio::test]
async fn test_top_ties_prefer_newest_then_code() {
    let store = MemoryStore::default();
    let now = Utc::now();
    for code in ["y", "x"] {
        let mut record = ShortUrlRecord::new(code, "https://example.com", None);
        record.created_at = now;
        store.insert(record).await.unwrap();
    }
    let mut newest = ShortUrlRecord::new("z", "https://example.com/z", None);
    newest.created_at = now + Duration::seconds(1);
    store.insert(newest).await.unwrap();

    let ranked: Vec<_> = store
        .top_by_clicks(10)
        .await
        .unwrap()
        .into_iter()
        .map(|t| t.short_code)
        .collect();
    assert_eq!(ranked, vec!["z", "x", "y"]);
}

// =============================================================================
// Persistence
// =============================================================================

#[tokio::test]
async fn test_file_store_survives_reopen() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("links.json");

    {
        let store = FileStore::open(&path, StoreOptions::default()).unwrap();
        store
            .insert(ShortUrlRecord::new("keep", "https://example.com/keep", Some("keep".into())))
            .await
            .unwrap();
        store.record_click("keep", ClickEvent::new()).await.unwrap();
        store.advance_counter(42).await.unwrap();
    }

    let reopened = FileStore::open(&path, StoreOptions::default()).unwrap();
    let record = reopened.get("keep").await.unwrap().unwrap();
    assert_eq!(record.click_count, 1);
    assert_eq!(record.recent_clicks.len(), 1);
    assert_eq!(record.custom_alias.as_deref(), Some("keep"));
    assert_eq!(reopened.load_counter().await.unwrap(), 42);
    assert_eq!(
        reopened
            .clicks_since(Utc::now() - Duration::minutes(5))
            .await
            .unwrap(),
        1
    );
}

#[tokio::test]
async fn test_codes_not_reused_after_restart() {
    let dir = TempDir::new().unwrap();
    let config = StaticConfig::default();
    let storage = StorageConfig {
        backend: "file".into(),
        file_path: dir.path().join("links.json").to_string_lossy().into_owned(),
    };
    let ctx = RequestContext::new("127.0.0.1");

    let last = {
        let store = StorageFactory::create(&storage, StoreOptions::default()).unwrap();
        let service = LinkService::bootstrap(store, &config).await.unwrap();
        let mut last = String::new();
        for i in 0..3 {
            last = service
                .create(CreateLinkRequest::new(format!("https://example.com/{}", i)), &ctx)
                .await
                .unwrap()
                .record
                .short_code;
        }
        // 删除最后一个：记录数回落到 2，但高水位仍是 3
        service.delete(&last).await.unwrap();
        last
    };
    assert_eq!(last, "2");

    let store = StorageFactory::create(&storage, StoreOptions::default()).unwrap();
    let service = LinkService::bootstrap(store, &config).await.unwrap();
    let next = service
        .create(CreateLinkRequest::new("https://example.com/after-restart"), &ctx)
        .await
        .unwrap()
        .record
        .short_code;

    assert_eq!(next, "3");
}

#[tokio::test]
async fn test_snapshot_without_counter_seeds_from_record_count() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("links.json");
    std::fs::write(
        &path,
        r#"{"links": [
            {"short_code": "0", "original_url": "https://a.com", "created_at": "2024-01-01T00:00:00Z"},
            {"short_code": "1", "original_url": "https://b.com", "created_at": "2024-01-02T00:00:00Z"}
        ]}"#,
    )
    .unwrap();

    let store = FileStore::open(&path, StoreOptions::default()).unwrap();
    assert_eq!(store.load_counter().await.unwrap(), 2);
}
