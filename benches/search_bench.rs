//! Benchmarks for brute-force search

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use vecstore::{DistanceMetric, Filter, Metadata, VectorStore};

fn create_random_vectors(n: usize, dim: usize) -> Vec<Vec<f32>> {
    (0..n)
        .map(|_| (0..dim).map(|_| rand::random::<f32>() + 0.01).collect())
        .collect()
}

fn benchmark_search(c: &mut Criterion) {
    let mut group = c.benchmark_group("search");

    for metric in [DistanceMetric::Cosine, DistanceMetric::Euclidean] {
        for size in [100, 1000, 10000].iter() {
            let mut store = VectorStore::new(128, metric).unwrap();
            let vectors = create_random_vectors(*size, 128);

            for (i, v) in vectors.into_iter().enumerate() {
                let metadata = Metadata::new().with("even", i % 2 == 0);
                store.add(format!("v{}", i), v, metadata).unwrap();
            }

            let query: Vec<f32> = vec![0.5; 128];
            let filter = Filter::new().equals("even", true);

            group.bench_with_input(BenchmarkId::new(metric.as_str(), size), size, |b, _| {
                b.iter(|| store.search(black_box(&query), black_box(10), None).unwrap());
            });
            group.bench_with_input(
                BenchmarkId::new(format!("{}_filtered", metric), size),
                size,
                |b, _| {
                    b.iter(|| {
                        store
                            .search(black_box(&query), black_box(10), Some(&filter))
                            .unwrap()
                    });
                },
            );
        }
    }

    group.finish();
}

criterion_group!(benches, benchmark_search);
criterion_main!(benches);
