//! 令牌桶限流性能基准测试

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};
use snaplink::ratelimit::RateLimiter;
use std::time::{Duration, Instant};

fn bench_single_client(c: &mut Criterion) {
    // 容量足够大，基准期间始终放行
    let limiter = RateLimiter::new(f64::MAX, 1.0);
    c.bench_function("ratelimit/check_single_client", |b| {
        b.iter(|| limiter.check("198.51.100.1"))
    });

    let throttled = RateLimiter::new(1.0, 0.0);
    throttled.check("198.51.100.2");
    c.bench_function("ratelimit/check_rejected", |b| {
        b.iter(|| throttled.check("198.51.100.2"))
    });
}

fn bench_many_clients(c: &mut Criterion) {
    let mut group = c.benchmark_group("ratelimit/many_clients");

    for clients in [100, 1000, 10000] {
        let ids: Vec<String> = (0..clients).map(|i| format!("client_{}", i)).collect();
        let limiter = RateLimiter::new(1_000_000.0, 1000.0);

        group.throughput(Throughput::Elements(clients as u64));
        group.bench_with_input(BenchmarkId::new("clients", clients), &ids, |b, ids| {
            b.iter(|| {
                for id in ids {
                    limiter.allow(id);
                }
            });
        });
    }
    group.finish();
}

fn bench_purge_idle(c: &mut Criterion) {
    c.bench_function("ratelimit/purge_idle_10k", |b| {
        b.iter_batched(
            || {
                let limiter = RateLimiter::new(10.0, 1.0);
                let past = Instant::now();
                for i in 0..10000 {
                    limiter.check_at(&format!("client_{}", i), past);
                }
                limiter
            },
            |limiter| limiter.purge_idle(Duration::ZERO, Instant::now()),
            criterion::BatchSize::LargeInput,
        );
    });
}

criterion_group!(benches, bench_single_client, bench_many_clients, bench_purge_idle);
criterion_main!(benches);
