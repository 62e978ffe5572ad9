//! Link orchestration service
//!
//! Ties the code generator, URL cache, rate limiter and click aggregator to a
//! `Store`. HTTP handlers stay thin and call into this service.

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use crate::analytics::{AnalyticsSummary, ClickAggregator, ClickEvent};
use crate::cache::{CacheStats, UrlCache};
use crate::codegen::CodeGenerator;
use crate::config::StaticConfig;
use crate::errors::{Result, SnaplinkError};
use crate::ratelimit::RateLimiter;
use crate::storage::{LinkStats, ShortUrlRecord, Store};
use crate::utils::{MAX_ALIAS_LENGTH, is_valid_alias, normalize_url};

/// 列表接口默认条数
pub const DEFAULT_LIST_LIMIT: usize = 100;
/// 列表接口最大条数
pub const MAX_LIST_LIMIT: usize = 1000;

// ============ Request/Response DTOs ============

/// Request to shorten a URL
#[derive(Debug, Clone)]
pub struct CreateLinkRequest {
    pub url: String,
    /// Custom alias (optional, a code is generated when absent)
    pub custom_alias: Option<String>,
}

impl CreateLinkRequest {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            custom_alias: None,
        }
    }

    pub fn with_alias(url: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            custom_alias: Some(alias.into()),
        }
    }
}

/// Result of link creation
#[derive(Debug, Clone)]
pub struct LinkCreateResult {
    pub record: ShortUrlRecord,
    /// `false` when an existing record for the same URL was returned
    pub created: bool,
}

/// Who is calling, plus the headers recorded on a click
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// Rate limiter identity (client IP, or "unknown")
    pub client_id: String,
    pub user_agent: Option<String>,
    pub referrer: Option<String>,
}

impl RequestContext {
    pub fn new(client_id: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            user_agent: None,
            referrer: None,
        }
    }

    fn click_event(&self) -> ClickEvent {
        ClickEvent::at(Utc::now()).with_headers(self.user_agent.clone(), self.referrer.clone())
    }
}

/// 限流器状态
#[derive(Debug, Clone, Serialize)]
pub struct RateLimiterStats {
    pub tracked_clients: usize,
    pub capacity: f64,
    pub refill_per_second: f64,
}

/// System-wide metrics: click aggregates plus cache and limiter state
#[derive(Debug, Clone, Serialize)]
pub struct SystemMetrics {
    #[serde(flatten)]
    pub analytics: AnalyticsSummary,
    pub cache_stats: CacheStats,
    pub rate_limiter: RateLimiterStats,
}

/// Service description for the info endpoint
#[derive(Debug, Clone, Serialize)]
pub struct ServiceInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub storage_backend: &'static str,
    pub features: Vec<&'static str>,
}

// ============ LinkService Implementation ============

pub struct LinkService {
    store: Arc<dyn Store>,
    generator: CodeGenerator,
    cache: UrlCache,
    limiter: RateLimiter,
    analytics: ClickAggregator,
}

impl LinkService {
    pub fn new(
        store: Arc<dyn Store>,
        generator: CodeGenerator,
        cache: UrlCache,
        limiter: RateLimiter,
        analytics: ClickAggregator,
    ) -> Self {
        Self {
            store,
            generator,
            cache,
            limiter,
            analytics,
        }
    }

    /// Build every component from `config`, seeding the generator from the
    /// store's high-water mark.
    pub async fn bootstrap(store: Arc<dyn Store>, config: &StaticConfig) -> Result<Self> {
        let seed = store.load_counter().await?;
        info!(
            "LinkService: counter seeded at {} ({} backend)",
            seed,
            store.backend_name()
        );

        let generator = CodeGenerator::new(seed, config.codegen.max_retries);
        let cache = UrlCache::new(config.cache.capacity);
        let limiter = RateLimiter::from_config(&config.rate_limit);
        let analytics = ClickAggregator::new(store.clone(), &config.analytics);

        Ok(Self::new(store, generator, cache, limiter, analytics))
    }

    pub fn cache(&self) -> &UrlCache {
        &self.cache
    }

    pub fn limiter(&self) -> &RateLimiter {
        &self.limiter
    }

    pub fn store(&self) -> &Arc<dyn Store> {
        &self.store
    }

    /// Reject the request when `client_id` is out of tokens.
    fn admit(&self, client_id: &str) -> Result<()> {
        let decision = self.limiter.check(client_id);
        if decision.allowed {
            Ok(())
        } else {
            Err(SnaplinkError::rate_limited(decision.retry_after_secs()))
        }
    }

    fn storage_error(action: &str, e: SnaplinkError) -> SnaplinkError {
        error!("LinkService: failed to {}: {}", action, e);
        match e {
            SnaplinkError::StorageOperation(_)
            | SnaplinkError::FileOperation(_)
            | SnaplinkError::Serialization(_) => e,
            other => SnaplinkError::storage_operation(format!("Failed to {}: {}", action, other)),
        }
    }

    // ============ Operations ============

    /// Shorten a URL, optionally under a custom alias
    pub async fn create(
        &self,
        req: CreateLinkRequest,
        ctx: &RequestContext,
    ) -> Result<LinkCreateResult> {
        self.admit(&ctx.client_id)?;

        let original_url =
            normalize_url(&req.url).map_err(|e| SnaplinkError::validation(e.to_string()))?;

        let alias = req.custom_alias.filter(|a| !a.trim().is_empty());
        let record = match alias {
            Some(alias) => self.create_with_alias(original_url, alias.trim()).await?,
            None => {
                let existing = self
                    .store
                    .find_by_url(&original_url)
                    .await
                    .map_err(|e| Self::storage_error("look up existing url", e))?;
                if let Some(existing) = existing {
                    debug!(
                        "LinkService: '{}' already shortened as '{}'",
                        original_url, existing.short_code
                    );
                    self.cache
                        .put(existing.short_code.clone(), existing.original_url.clone());
                    return Ok(LinkCreateResult {
                        record: existing,
                        created: false,
                    });
                }
                self.create_generated(original_url).await?
            }
        };

        self.cache
            .put(record.short_code.clone(), record.original_url.clone());
        info!(
            "LinkService: created link '{}' -> '{}'",
            record.short_code, record.original_url
        );

        Ok(LinkCreateResult {
            record,
            created: true,
        })
    }

    async fn create_with_alias(&self, original_url: String, alias: &str) -> Result<ShortUrlRecord> {
        if !is_valid_alias(alias) {
            return Err(SnaplinkError::validation(format!(
                "Invalid alias '{}'. Use 1-{} characters from [A-Za-z0-9_-].",
                alias, MAX_ALIAS_LENGTH
            )));
        }

        let record = ShortUrlRecord::new(alias, original_url, Some(alias.to_string()));
        let inserted = self
            .store
            .insert(record.clone())
            .await
            .map_err(|e| Self::storage_error("save link", e))?;
        if !inserted {
            return Err(SnaplinkError::alias_conflict(format!(
                "Custom alias '{}' already taken",
                alias
            )));
        }
        Ok(record)
    }

    async fn create_generated(&self, original_url: String) -> Result<ShortUrlRecord> {
        let created_at = Utc::now();
        let store = Arc::clone(&self.store);
        let url = original_url.clone();

        // 插入即占位：insert 返回 false 说明短码已被占用
        let code = self
            .generator
            .next_available(|code| {
                let store = Arc::clone(&store);
                let mut record = ShortUrlRecord::new(code, url.clone(), None);
                record.created_at = created_at;
                async move {
                    let inserted = store.insert(record).await?;
                    Ok::<bool, SnaplinkError>(!inserted)
                }
            })
            .await?;

        if let Err(e) = self.store.advance_counter(self.generator.high_water()).await {
            // 记录已写入；高水位落后时重启后由冲突重试兜底
            warn!("LinkService: failed to persist counter: {}", e);
        }

        let mut record = ShortUrlRecord::new(code, original_url, None);
        record.created_at = created_at;
        Ok(record)
    }

    /// Resolve a short code to its URL and record the click
    pub async fn resolve(&self, short_code: &str, ctx: &RequestContext) -> Result<String> {
        self.admit(&ctx.client_id)?;

        let original_url = match self.cache.get(short_code) {
            Some(url) => url,
            None => {
                let record = self
                    .store
                    .get(short_code)
                    .await
                    .map_err(|e| Self::storage_error("get link", e))?
                    .ok_or_else(|| {
                        SnaplinkError::not_found(format!("Short URL '{}' not found", short_code))
                    })?;
                self.cache.put(short_code, record.original_url.clone());
                record.original_url
            }
        };

        // 缓存填充先于点击写入：并发删除若已完成，点击必然落空
        match self.analytics.record(short_code, ctx.click_event()).await {
            Ok(Some(_)) => {}
            Ok(None) => {
                self.cache.remove(short_code);
                debug!("LinkService: '{}' deleted during resolve", short_code);
                return Err(SnaplinkError::not_found(format!(
                    "Short URL '{}' not found",
                    short_code
                )));
            }
            Err(e) => {
                error!("LinkService: failed to record click for '{}': {}", short_code, e);
            }
        }

        Ok(original_url)
    }

    /// Full record with recent clicks, most recent first
    pub async fn stats(&self, short_code: &str) -> Result<LinkStats> {
        let record = self
            .store
            .get(short_code)
            .await
            .map_err(|e| Self::storage_error("get link", e))?
            .ok_or_else(|| {
                SnaplinkError::not_found(format!("Short URL '{}' not found", short_code))
            })?;
        Ok(LinkStats::from(record))
    }

    /// Newest links first. `limit` defaults to 100 and is clamped to 1..=1000.
    pub async fn list(&self, limit: Option<usize>) -> Result<Vec<ShortUrlRecord>> {
        let limit = limit
            .unwrap_or(DEFAULT_LIST_LIMIT)
            .clamp(1, MAX_LIST_LIMIT);
        self.store
            .list(limit)
            .await
            .map_err(|e| Self::storage_error("list links", e))
    }

    /// Delete a link, its click history and its cache entry
    pub async fn delete(&self, short_code: &str) -> Result<()> {
        let removed = self
            .store
            .remove(short_code)
            .await
            .map_err(|e| Self::storage_error("delete link", e))?;

        self.cache.remove(short_code);

        if !removed {
            return Err(SnaplinkError::not_found(format!(
                "Short URL '{}' not found",
                short_code
            )));
        }

        info!("LinkService: deleted link '{}'", short_code);
        Ok(())
    }

    pub async fn metrics(&self) -> Result<SystemMetrics> {
        let analytics = self
            .analytics
            .summary()
            .await
            .map_err(|e| Self::storage_error("compute metrics", e))?;

        Ok(SystemMetrics {
            analytics,
            cache_stats: self.cache.stats(),
            rate_limiter: RateLimiterStats {
                tracked_clients: self.limiter.tracked(),
                capacity: self.limiter.capacity(),
                refill_per_second: self.limiter.refill_rate(),
            },
        })
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
        info!("LinkService: cache cleared");
    }

    pub fn info(&self) -> ServiceInfo {
        ServiceInfo {
            name: env!("CARGO_PKG_NAME"),
            version: env!("CARGO_PKG_VERSION"),
            storage_backend: self.store.backend_name(),
            features: vec![
                "base62 short codes",
                "custom aliases",
                "lru cache",
                "token bucket rate limiting",
                "click analytics",
            ],
        }
    }

    /// Forget limiter buckets idle for at least `max_idle`.
    pub fn purge_idle_clients(&self, max_idle: Duration) -> usize {
        self.limiter.purge_idle(max_idle, Instant::now())
    }
}
