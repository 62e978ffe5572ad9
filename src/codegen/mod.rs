//! Short code generation
//!
//! Codes come from a process-wide monotonic counter encoded in base62, so two
//! calls never see the same counter value. The counter is seeded at startup
//! from the store's high-water mark and only ever moves forward.

pub mod base62;

use std::future::Future;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::{debug, error};

use crate::errors::{Result, SnaplinkError};

/// 默认的冲突重试次数
pub const DEFAULT_MAX_RETRIES: u32 = 16;

pub struct CodeGenerator {
    counter: AtomicU64,
    max_retries: u32,
}

impl CodeGenerator {
    /// Create a generator whose first code encodes `seed`.
    pub fn new(seed: u64, max_retries: u32) -> Self {
        Self {
            counter: AtomicU64::new(seed),
            max_retries,
        }
    }

    /// Take the current counter value and advance it.
    pub fn next_value(&self) -> u64 {
        self.counter.fetch_add(1, Ordering::Relaxed)
    }

    /// Produce the next code from the counter.
    pub fn next_code(&self) -> String {
        base62::encode(self.next_value())
    }

    /// The value the next call to `next_code` will use. Every value below it
    /// has been handed out.
    pub fn high_water(&self) -> u64 {
        self.counter.load(Ordering::Relaxed)
    }

    /// Generate a code that `is_taken` reports as free.
    ///
    /// Custom aliases live in the same code space as generated codes, so a
    /// generated code can collide with an alias a caller picked earlier. On a
    /// collision the counter has already moved on and the next value is
    /// tried, up to `max_retries` extra attempts.
    pub async fn next_available<F, Fut>(&self, mut is_taken: F) -> Result<String>
    where
        F: FnMut(String) -> Fut,
        Fut: Future<Output = Result<bool>>,
    {
        for attempt in 0..=self.max_retries {
            let code = self.next_code();
            if !is_taken(code.clone()).await? {
                return Ok(code);
            }
            debug!(
                "CodeGenerator: '{}' already taken (attempt {}), advancing",
                code,
                attempt + 1
            );
        }

        error!(
            "CodeGenerator: exhausted {} retries at counter {}",
            self.max_retries,
            self.high_water()
        );
        Err(SnaplinkError::generation_exhausted(format!(
            "No free short code after {} attempts",
            self.max_retries + 1
        )))
    }
}

impl Default for CodeGenerator {
    fn default() -> Self {
        Self::new(0, DEFAULT_MAX_RETRIES)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn test_sequential_codes() {
        let generator = CodeGenerator::default();
        assert_eq!(generator.next_code(), "0");
        assert_eq!(generator.next_code(), "1");
        assert_eq!(generator.high_water(), 2);
    }

    #[test]
    fn test_seeded_generator() {
        let generator = CodeGenerator::new(62, DEFAULT_MAX_RETRIES);
        assert_eq!(generator.next_code(), "10");
        assert_eq!(generator.high_water(), 63);
    }

    #[test]
    fn test_codes_are_distinct() {
        let generator = CodeGenerator::default();
        let codes: HashSet<String> = (0..10_000).map(|_| generator.next_code()).collect();
        assert_eq!(codes.len(), 10_000);
    }

    #[test]
    fn test_concurrent_codes_are_distinct() {
        let generator = Arc::new(CodeGenerator::default());
        const THREADS: usize = 8;
        const PER_THREAD: usize = 1000;

        let handles: Vec<_> = (0..THREADS)
            .map(|_| {
                let generator = Arc::clone(&generator);
                std::thread::spawn(move || {
                    (0..PER_THREAD)
                        .map(|_| generator.next_code())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut all = HashSet::new();
        for handle in handles {
            for code in handle.join().unwrap() {
                assert!(all.insert(code), "duplicate code generated");
            }
        }
        assert_eq!(all.len(), THREADS * PER_THREAD);
        assert_eq!(generator.high_water(), (THREADS * PER_THREAD) as u64);
    }

    #[tokio::test]
    async fn test_next_available_skips_taken_codes() {
        let generator = CodeGenerator::default();
        let taken: HashSet<&str> = ["0", "1"].into_iter().collect();

        let code = generator
            .next_available(|c| {
                let hit = taken.contains(c.as_str());
                async move { Ok::<_, SnaplinkError>(hit) }
            })
            .await
            .unwrap();

        assert_eq!(code, "2");
        assert_eq!(generator.high_water(), 3);
    }

    #[tokio::test]
    async fn test_next_available_exhausted() {
        let generator = CodeGenerator::new(0, 3);
        let result = generator.next_available(|_| async { Ok::<_, SnaplinkError>(true) }).await;

        assert!(matches!(
            result,
            Err(SnaplinkError::GenerationExhausted(_))
        ));
        // 初次尝试 + 3 次重试
        assert_eq!(generator.high_water(), 4);
    }

    #[tokio::test]
    async fn test_next_available_propagates_store_errors() {
        let generator = CodeGenerator::default();
        let result = generator
            .next_available(|_| async { Err::<bool, _>(SnaplinkError::storage_operation("down")) })
            .await;
        assert!(matches!(result, Err(SnaplinkError::StorageOperation(_))));
    }
}
