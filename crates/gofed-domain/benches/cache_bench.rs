//! Performance benchmarks for the bounded cache.
//!
//! Run with: cargo bench -p gofed-domain
//!
//! These benchmarks measure:
//! - Uncontended get/set cost
//! - Eviction cost when the cache is full
//! - Mixed read/write throughput under task contention

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use tokio::runtime::Runtime;

use gofed_domain::cache::{BoundedCache, BoundedCacheConfig};
use gofed_domain::model::User;

fn user(i: usize) -> User {
    User::new(
        i.to_string(),
        format!("User{i}"),
        format!("user{i}@example.com"),
    )
}

fn populated_cache(capacity: usize) -> Arc<BoundedCache<User>> {
    let cache = Arc::new(BoundedCache::new(BoundedCacheConfig::new(capacity)).unwrap());
    for i in 0..capacity {
        cache.set(i.to_string(), user(i));
    }
    cache
}

fn bench_uncontended(c: &mut Criterion) {
    let cache = populated_cache(1_000);
    let mut group = c.benchmark_group("cache_uncontended");

    group.bench_function("get_hit", |b| {
        b.iter(|| black_box(cache.get(black_box("500"))))
    });
    group.bench_function("get_miss", |b| {
        b.iter(|| black_box(cache.get(black_box("missing"))))
    });
    group.bench_function("upsert", |b| {
        b.iter(|| black_box(cache.set("500", user(500))))
    });

    group.finish();
}

fn bench_eviction(c: &mut Criterion) {
    let cache = populated_cache(100);
    let mut next = 100usize;

    c.bench_function("cache_set_with_eviction", |b| {
        b.iter(|| {
            next += 1;
            black_box(cache.set(next.to_string(), user(next)))
        })
    });
}

fn bench_contended(c: &mut Criterion) {
    let rt = Runtime::new().unwrap();
    let cache = populated_cache(100);
    let mut group = c.benchmark_group("cache_contended");

    for tasks in [1usize, 4, 16] {
        let ops_per_task = 100;
        group.throughput(Throughput::Elements((tasks * ops_per_task) as u64));
        group.bench_with_input(BenchmarkId::from_parameter(tasks), &tasks, |b, &tasks| {
            b.to_async(&rt).iter(|| {
                let cache = Arc::clone(&cache);
                async move {
                    let handles: Vec<_> = (0..tasks)
                        .map(|t| {
                            let cache = Arc::clone(&cache);
                            tokio::spawn(async move {
                                for i in 0..ops_per_task {
                                    // One write for every three reads
                                    if i % 4 == 0 {
                                        cache.set("1", user(t));
                                    } else {
                                        black_box(cache.get(&(i % 100).to_string()));
                                    }
                                }
                                black_box(cache.list().len())
                            })
                        })
                        .collect();
                    for handle in handles {
                        let _ = handle.await;
                    }
                }
            })
        });
    }

    group.finish();
}

criterion_group!(benches, bench_uncontended, bench_eviction, bench_contended);
criterion_main!(benches);
