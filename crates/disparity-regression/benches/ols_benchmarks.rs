use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use disparity_regression::{Diagnostics, DesignMatrix, OlsRegression, PredictorColumn};
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use rand_distr::Normal;

/// Income-like data with one numeric and two categorical predictors
fn generate_design(size: usize, seed: u64) -> (DesignMatrix, Vec<f64>) {
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    let noise = Normal::new(0.0, 5_000.0).unwrap();

    let years: Vec<f64> = (0..size).map(|_| rng.gen_range(0.0..40.0)).collect();
    let education: Vec<usize> = (0..size).map(|_| rng.gen_range(0..5)).collect();
    let marital: Vec<usize> = (0..size).map(|_| rng.gen_range(0..5)).collect();
    let income: Vec<f64> = (0..size)
        .map(|i| {
            25_000.0 + 800.0 * years[i] + 6_000.0 * education[i] as f64
                - 1_500.0 * marital[i] as f64
                + noise.sample(&mut rng)
        })
        .collect();

    let levels = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
    let design = DesignMatrix::build(
        size,
        &[
            PredictorColumn::Numeric {
                name: "years".to_string(),
                values: years,
            },
            PredictorColumn::Categorical {
                name: "education".to_string(),
                levels: levels(&["NoDegree", "HighSchool", "Associates", "Bachelors", "Graduate"]),
                codes: education,
            },
            PredictorColumn::Categorical {
                name: "marital_status".to_string(),
                levels: levels(&["NeverMarried", "Married", "Separated", "Divorced", "Widowed"]),
                codes: marital,
            },
        ],
    )
    .unwrap();
    (design, income)
}

fn bench_ols_fit(c: &mut Criterion) {
    let mut group = c.benchmark_group("OlsFit");
    let ols = OlsRegression::default();

    for &size in &[100, 1_000, 10_000] {
        let (design, income) = generate_design(size, 42);
        group.bench_with_input(BenchmarkId::new("fit", size), &size, |b, _| {
            b.iter(|| ols.fit(black_box(&design), black_box(&income)).unwrap())
        });

        let model = ols.fit(&design, &income).unwrap();
        group.bench_with_input(BenchmarkId::new("diagnostics", size), &size, |b, _| {
            b.iter(|| Diagnostics::compute(black_box(&model), black_box(&design)).unwrap())
        });
    }

    group.finish();
}

criterion_group!(benches, bench_ols_fit);
criterion_main!(benches);
