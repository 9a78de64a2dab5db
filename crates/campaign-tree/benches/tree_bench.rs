//! Criterion benchmarks for campaign-tree: growing, pruning, and scoring.

use criterion::{Criterion, criterion_group, criterion_main};
use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

use campaign_tree::{ComplexitySearch, DecisionTreeConfig, FeatureKind};

fn make_dataset(n_samples: usize, n_features: usize, seed: u64) -> (Vec<Vec<f64>>, Vec<usize>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let mut features = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for i in 0..n_samples {
        let label = usize::from(i % 8 == 0);
        labels.push(label);
        let row: Vec<f64> = (0..n_features)
            .map(|f| {
                let base = if f < 3 { label as f64 * 1.5 } else { 0.0 };
                base + rng.r#gen::<f64>()
            })
            .collect();
        features.push(row);
    }
    (features, labels)
}

fn bench_tree_fit(c: &mut Criterion) {
    let (features, labels) = make_dataset(2000, 16, 42);
    let kinds = vec![FeatureKind::Numeric; 16];
    let cfg = DecisionTreeConfig::new();

    c.bench_function("tree_fit_2000x16", |b| {
        b.iter(|| cfg.fit(&features, &labels, &kinds).unwrap());
    });
}

fn bench_tree_score(c: &mut Criterion) {
    let (features, labels) = make_dataset(2000, 16, 42);
    let kinds = vec![FeatureKind::Numeric; 16];
    let tree = DecisionTreeConfig::new()
        .fit(&features, &labels, &kinds)
        .unwrap();

    c.bench_function("tree_score_2000x16", |b| {
        b.iter(|| {
            features
                .iter()
                .map(|row| tree.score_probability(row).unwrap())
                .sum::<f64>()
        });
    });
}

fn bench_complexity_search(c: &mut Criterion) {
    let (features, labels) = make_dataset(1000, 8, 42);
    let kinds = vec![FeatureKind::Numeric; 8];
    let search = ComplexitySearch::new(5).unwrap();
    let cfg = DecisionTreeConfig::new();

    c.bench_function("complexity_search_1000x8_5fold", |b| {
        b.iter(|| search.search(&cfg, &features, &labels, &kinds).unwrap());
    });
}

criterion_group!(benches, bench_tree_fit, bench_tree_score, bench_complexity_search);
criterion_main!(benches);
