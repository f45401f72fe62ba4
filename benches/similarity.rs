//! Similarity-search benchmarks: raw cosine distance at embedding size, and
//! a full nearest-neighbor scan through the SQLite store.

use criterion::{black_box, criterion_group, criterion_main, Criterion};
use tokio::runtime::Runtime;

use askrio::adapters::sqlite::{cosine_distance, SqliteCollectionStore};
use askrio::domain::models::catalog::CollectionEntry;
use askrio::domain::ports::CollectionStore;

/// Deterministic dense vector; values spread across [-0.5, 0.5].
fn seeded_vector(seed: usize, dimension: usize) -> Vec<f32> {
    let mut state = seed as u32 ^ 0x9E37_79B9;
    (0..dimension)
        .map(|_| {
            state = state.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
            ((state >> 16) as f32 / 65_536.0) - 0.5
        })
        .collect()
}

fn bench_cosine_distance(c: &mut Criterion) {
    let a = seeded_vector(1, 3072);
    let b = seeded_vector(2, 3072);

    c.bench_function("cosine_distance_3072", |bencher| {
        bencher.iter(|| cosine_distance(black_box(&a), black_box(&b)));
    });
}

fn bench_nearest_scan(c: &mut Criterion) {
    let runtime = Runtime::new().expect("failed to build runtime");

    let store = runtime.block_on(async {
        let store = SqliteCollectionStore::open_in_memory()
            .await
            .expect("failed to open store");
        store
            .create_collection("bench_collection", 128)
            .await
            .expect("failed to create collection");

        let entries: Vec<CollectionEntry> = (0..5000)
            .map(|i| {
                CollectionEntry::at_position(
                    "bench_collection",
                    i,
                    format!("valor {i:04}"),
                    seeded_vector(i, 128),
                )
            })
            .collect();
        store
            .insert_entries("bench_collection", &entries)
            .await
            .expect("failed to insert entries");
        store
    });

    let query = seeded_vector(99_991, 128);

    c.bench_function("nearest_5000_entries_dim128", |bencher| {
        bencher.to_async(&runtime).iter(|| async {
            store
                .nearest("bench_collection", black_box(&query), 5)
                .await
                .expect("nearest failed")
        });
    });
}

criterion_group!(benches, bench_cosine_distance, bench_nearest_scan);
criterion_main!(benches);
