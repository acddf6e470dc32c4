use criterion::{black_box, criterion_group, criterion_main, Criterion};
use gini_tree::{Dataset, ExampleSource, Tree, TreeConfig};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

fn create_data(n_samples: usize, n_features: usize) -> Dataset<usize> {
    let mut rng = StdRng::seed_from_u64(1903);
    let mut rows = Vec::with_capacity(n_samples);
    let mut labels = Vec::with_capacity(n_samples);
    for _ in 0..n_samples {
        let row: Vec<f64> = (0..n_features).map(|_| rng.gen_range(0.0..1.0)).collect();
        // Label by quadrant of the first two features, with some noise.
        let mut label = usize::from(row[0] > 0.5) * 2 + usize::from(row[1] > 0.5);
        if rng.gen_bool(0.05) {
            label = rng.gen_range(0..4);
        }
        rows.push(row);
        labels.push(label);
    }
    Dataset::from_rows(rows, labels).unwrap()
}

pub fn tree_benchmarks(c: &mut Criterion) {
    let data = create_data(500, 5);
    let rows: Vec<Vec<f64>> = (0..data.count()).map(|i| data.get(i).features.clone()).collect();

    let config = TreeConfig {
        max_rounds: Some(4),
        ..TreeConfig::default()
    };
    c.bench_function("Run Epoch", |b| {
        let mut tree = Tree::with_config(&data, config.clone()).unwrap();
        tree.fit().unwrap();
        b.iter(|| tree.run_epoch().unwrap())
    });
    c.bench_function("Fit Tree - 4 rounds", |b| {
        b.iter(|| {
            let mut tree = Tree::with_config(black_box(&data), config.clone()).unwrap();
            tree.fit().unwrap()
        })
    });

    let mut group = c.benchmark_group("fit_full_tree");
    group.sample_size(10);
    group.bench_function("Fit Tree - fixed point", |b| {
        b.iter(|| {
            let mut tree = Tree::new(black_box(&data));
            tree.fit().unwrap()
        })
    });
    group.finish();

    let mut tree = Tree::new(&data);
    tree.fit().unwrap();
    c.bench_function("Tree Predict (Single Threaded)", |b| {
        let sequential = TreeConfig {
            parallel_predict: false,
            ..TreeConfig::default()
        };
        let mut tree = Tree::with_config(&data, sequential).unwrap();
        tree.fit().unwrap();
        b.iter(|| tree.predict(black_box(&rows)))
    });
    c.bench_function("Tree Predict (Multithreaded)", |b| {
        b.iter(|| tree.predict(black_box(&rows)))
    });
}

criterion_group!(benches, tree_benchmarks);
criterion_main!(benches);
