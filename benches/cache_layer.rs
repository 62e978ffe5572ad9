//! 链接缓存与短码生成性能基准测试

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use snaplink::cache::UrlCache;
use snaplink::codegen::{CodeGenerator, base62};
use std::sync::atomic::{AtomicU64, Ordering};

// ============== LRU 缓存基准测试 ==============

fn bench_cache_get(c: &mut Criterion) {
    let cache = UrlCache::new(1000);
    for i in 0..1000 {
        cache.put(format!("key_{}", i), format!("https://example.com/{}", i));
    }

    c.bench_function("lru/get_hit", |b| b.iter(|| cache.get("key_500")));
    c.bench_function("lru/get_miss", |b| b.iter(|| cache.get("nonexistent_key")));
}

fn bench_cache_put_evicting(c: &mut Criterion) {
    let cache = UrlCache::new(1000);
    let counter = AtomicU64::new(0);

    // 缓存已满，每次 put 都会淘汰最久未用的条目
    c.bench_function("lru/put_evicting", |b| {
        b.iter(|| {
            let i = counter.fetch_add(1, Ordering::Relaxed);
            cache.put(format!("key_{}", i), "https://example.com");
        });
    });
}

fn bench_cache_fill(c: &mut Criterion) {
    let mut group = c.benchmark_group("lru/fill");

    for size in [100, 1000, 10000] {
        let keys: Vec<String> = (0..size).map(|i| format!("fill_key_{}", i)).collect();

        group.throughput(Throughput::Elements(size as u64));
        group.bench_with_input(BenchmarkId::new("keys", size), &keys, |b, keys| {
            b.iter_batched(
                || UrlCache::new(size / 2),
                |cache| {
                    for key in keys {
                        cache.put(key.as_str(), "https://example.com");
                    }
                },
                criterion::BatchSize::SmallInput,
            );
        });
    }
    group.finish();
}

// ============== 短码生成基准测试 ==============

fn bench_codegen(c: &mut Criterion) {
    let generator = CodeGenerator::new(0, 16);
    c.bench_function("codegen/next_code", |b| b.iter(|| generator.next_code()));

    c.bench_function("codegen/base62_encode_max", |b| {
        b.iter(|| base62::encode(u64::MAX))
    });
}

criterion_group!(
    benches,
    bench_cache_get,
    bench_cache_put_evicting,
    bench_cache_fill,
    bench_codegen,
);
criterion_main!(benches);
