//! Per-caller token bucket admission control
//!
//! Each identity owns a bucket of up to `capacity` tokens that refills
//! continuously at `refill_rate` tokens per second. Refill is computed from
//! elapsed wall-clock time on every check, so the admission decision does not
//! depend on how often callers arrive.
//!
//! Buckets live in a `DashMap`; the entry guard held across refill-then-spend
//! serializes concurrent checks for the same identity.

use std::time::{Duration, Instant};

use dashmap::DashMap;
use tracing::{debug, trace};

use crate::config::RateLimitConfig;

/// 单个身份的令牌桶
#[derive(Debug, Clone, Copy)]
pub struct TokenBucket {
    tokens: f64,
    last_refill: Instant,
}

impl TokenBucket {
    /// A full bucket.
    pub fn new(capacity: f64, now: Instant) -> Self {
        Self {
            tokens: capacity,
            last_refill: now,
        }
    }

    pub fn tokens(&self) -> f64 {
        self.tokens
    }

    pub fn last_refill(&self) -> Instant {
        self.last_refill
    }

    fn refill(&mut self, capacity: f64, refill_rate: f64, now: Instant) {
        // 晚到的旧时间戳：elapsed 为 0，且 last_refill 不回退
        let elapsed = now.saturating_duration_since(self.last_refill).as_secs_f64();
        self.tokens = (self.tokens + elapsed * refill_rate).min(capacity);
        self.last_refill = self.last_refill.max(now);
    }

    /// Refill for the time elapsed since the last check, then spend one token
    /// if at least one is available.
    pub fn try_acquire(&mut self, capacity: f64, refill_rate: f64, now: Instant) -> bool {
        self.refill(capacity, refill_rate, now);
        if self.tokens >= 1.0 {
            self.tokens -= 1.0;
            true
        } else {
            false
        }
    }
}

/// Outcome of an admission check.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RateDecision {
    pub allowed: bool,
    /// Tokens left after this check.
    pub remaining: f64,
    /// Time until one full token is available; zero when admitted.
    pub retry_after: Duration,
}

impl RateDecision {
    /// `Retry-After` in whole seconds, rounded up and at least one.
    pub fn retry_after_secs(&self) -> u64 {
        if self.allowed {
            return 0;
        }
        (self.retry_after.as_secs_f64().ceil() as u64).max(1)
    }
}

pub struct RateLimiter {
    buckets: DashMap<String, TokenBucket>,
    capacity: f64,
    refill_rate: f64,
}

impl RateLimiter {
    /// `refill_rate` is in tokens per second.
    pub fn new(capacity: f64, refill_rate: f64) -> Self {
        Self {
            buckets: DashMap::new(),
            capacity,
            refill_rate,
        }
    }

    pub fn from_config(config: &RateLimitConfig) -> Self {
        Self::new(config.capacity, config.refill_per_second())
    }

    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    pub fn refill_rate(&self) -> f64 {
        self.refill_rate
    }

    /// Admit or reject one request from `identity`.
    pub fn allow(&self, identity: &str) -> bool {
        self.check_at(identity, Instant::now()).allowed
    }

    pub fn check(&self, identity: &str) -> RateDecision {
        self.check_at(identity, Instant::now())
    }

    /// Admission check against an explicit clock reading.
    pub fn check_at(&self, identity: &str, now: Instant) -> RateDecision {
        let mut bucket = self
            .buckets
            .entry(identity.to_string())
            .or_insert_with(|| TokenBucket::new(self.capacity, now));

        let allowed = bucket.try_acquire(self.capacity, self.refill_rate, now);
        let remaining = bucket.tokens();
        drop(bucket);

        if allowed {
            trace!("RateLimiter: admitted '{}', {:.2} tokens left", identity, remaining);
            return RateDecision {
                allowed,
                remaining,
                retry_after: Duration::ZERO,
            };
        }

        let retry_after = self.retry_after_for(remaining);
        debug!(
            "RateLimiter: throttled '{}', retry in {:.2}s",
            identity,
            retry_after.as_secs_f64()
        );
        RateDecision {
            allowed,
            remaining,
            retry_after,
        }
    }

    /// Time until `tokens` grows to one full token.
    fn retry_after_for(&self, tokens: f64) -> Duration {
        if self.refill_rate <= 0.0 {
            return Duration::MAX;
        }
        let secs = ((1.0 - tokens) / self.refill_rate).max(0.0);
        Duration::try_from_secs_f64(secs).unwrap_or(Duration::MAX)
    }

    /// Drop buckets that have been idle for at least `max_idle`.
    ///
    /// An idle bucket has refilled to capacity by then, so forgetting it does
    /// not change any future decision once `max_idle` covers a full refill.
    pub fn purge_idle(&self, max_idle: Duration, now: Instant) -> usize {
        let before = self.buckets.len();
        self.buckets
            .retain(|_, bucket| now.saturating_duration_since(bucket.last_refill()) < max_idle);
        let purged = before.saturating_sub(self.buckets.len());
        if purged > 0 {
            debug!("RateLimiter: purged {} idle buckets", purged);
        }
        purged
    }

    /// Number of identities currently tracked.
    pub fn tracked(&self) -> usize {
        self.buckets.len()
    }
}
