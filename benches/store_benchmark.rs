//! Performance benchmarks for bridge-cache
//!
//! This benchmark suite measures:
//! - Store operations (put, get by id, get by key, remove)
//! - Store behaviour as the number of entries grows
//! - EntityManager refresh hits and snapshot export
//!
//! Run with: cargo bench
//! View results: open target/criterion/report/index.html

use bridge_cache::model::Member;
use bridge_cache::source::InMemorySource;
use bridge_cache::{CacheRegistry, CacheStrategy, EntityCache, EntityManager, EntityStore, Lookup};
use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use rand::Rng;
use std::hint::black_box;

fn member(id: i64) -> Member {
    Member::new(id)
        .with_username(format!("user{}", id))
        .with_email(format!("user{}@example.org", id))
        .with_name("Bench", "Member")
}

fn populated(entries: i64) -> EntityStore<Member> {
    let store = EntityStore::new();
    for id in 0..entries {
        store.put(member(id)).expect("Failed to put");
    }
    store
}

// ============================================================================
// Group 1: Store Operations
// ============================================================================

fn store_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_store");

    for entries in [100i64, 10_000, 100_000].iter() {
        group
            .throughput(Throughput::Elements(1))
            .bench_with_input(BenchmarkId::new("get_by_id", entries), entries, |b, &entries| {
                let store = populated(entries);
                let mut rng = rand::rng();
                b.iter(|| store.get(black_box(rng.random_range(0..entries))));
            });

        group
            .throughput(Throughput::Elements(1))
            .bench_with_input(BenchmarkId::new("get_by_key", entries), entries, |b, &entries| {
                let store = populated(entries);
                let keys: Vec<String> = (0..entries).map(|id| format!("user{}", id)).collect();
                let mut rng = rand::rng();
                b.iter(|| {
                    let key = &keys[rng.random_range(0..keys.len())];
                    store.get_by_key(black_box(key))
                });
            });

        group
            .throughput(Throughput::Elements(1))
            .bench_with_input(BenchmarkId::new("put_replace", entries), entries, |b, &entries| {
                let store = populated(entries);
                let mut rng = rand::rng();
                b.iter(|| {
                    let id = rng.random_range(0..entries);
                    store.put(black_box(member(id))).expect("Failed to put")
                });
            });
    }

    // GET operation (miss) - size doesn't matter for misses
    group.bench_function("get_miss", |b| {
        let store = populated(100);
        b.iter(|| store.get_by_key(black_box("nobody")));
    });

    // REMOVE by key, re-put before each iteration
    group.bench_function("remove", |b| {
        let store = populated(1_000);
        b.iter(|| {
            store.put(member(1)).expect("Failed to put");
            store.remove(black_box("user1"));
        });
    });

    group.finish();
}

// ============================================================================
// Group 2: Manager And Snapshots
// ============================================================================

fn manager_benchmarks(c: &mut Criterion) {
    let mut group = c.benchmark_group("entity_manager");

    let rt = tokio::runtime::Runtime::new().expect("Failed to create Tokio runtime");

    group.bench_function("refresh_hit", |b| {
        let source = InMemorySource::new();
        source.insert(member(7));
        let manager = EntityManager::<Member, _>::new(&CacheRegistry::new(), source);
        let lookup = Lookup::key("user7");
        rt.block_on(async {
            manager
                .get(&lookup, CacheStrategy::Refresh)
                .await
                .expect("Failed to populate cache");
        });

        b.to_async(&rt)
            .iter(|| async { manager.get(black_box(&lookup), CacheStrategy::Refresh).await });
    });

    for entries in [100i64, 10_000].iter() {
        group.bench_with_input(BenchmarkId::new("export", entries), entries, |b, &entries| {
            let store = populated(entries);
            b.iter(|| store.export().expect("Failed to export"));
        });
    }

    group.finish();
}

criterion_group!(benches, store_benchmarks, manager_benchmarks);
criterion_main!(benches);
