//! Forecasting Benchmarks
//!
//! The auto-order ARIMA search dominates a training run; these benchmarks
//! track its cost against series length and grid size, plus the linear
//! regression fit it is compared with.

use criterion::{criterion_group, criterion_main, BenchmarkId, Criterion};
use macropanel::forecast::{ArimaSearch, AutoArima, Forecaster, SarimaForecaster};
use macropanel::ml::{LinearRegression, SupervisedModel};
use macropanel::{MonthPeriod, Panel};

/// Monthly-looking series: trend, yearly cycle and LCG noise
fn create_series(n: usize, seed: u64) -> Vec<f64> {
    let mut rng_state: u64 = seed;
    let mut rand_f64 = || -> f64 {
        rng_state = rng_state.wrapping_mul(6364136223846793005).wrapping_add(1);
        (rng_state >> 33) as f64 / (u32::MAX as f64)
    };

    (0..n)
        .map(|i| {
            let t = i as f64;
            100.0 + 0.4 * t + 5.0 * (t * 2.0 * std::f64::consts::PI / 12.0).sin() + rand_f64()
        })
        .collect()
}

fn create_panel(n: usize, n_features: usize) -> Panel {
    let mut index = Vec::with_capacity(n);
    let mut period = MonthPeriod::new(2000, 1).unwrap();
    for _ in 0..n {
        index.push(period);
        period = period.succ();
    }

    let mut columns = vec![("target".to_string(), create_series(n, 42))];
    for f in 0..n_features {
        let values = create_series(n, 43 + f as u64);
        columns.push((format!("feature_{}", f), values));
    }
    Panel::new(index, columns).unwrap()
}

fn bench_sarima(c: &mut Criterion) {
    let mut group = c.benchmark_group("SARIMA");

    for n in [60, 120, 240].iter() {
        let values = create_series(*n, 42);

        group.bench_with_input(BenchmarkId::new("fit_arima_111", n), &values, |b, values| {
            b.iter(|| {
                let mut model = SarimaForecaster::arima(1, 1, 1);
                model.fit(std::hint::black_box(values)).unwrap();
            });
        });

        let mut fitted = SarimaForecaster::new(1, 1, 1, 1, 0, 1, 12);
        fitted.fit(&values).unwrap();
        group.bench_with_input(BenchmarkId::new("forecast_12", n), &fitted, |b, model| {
            b.iter(|| {
                model.forecast(12, 0.95).unwrap();
            });
        });
    }

    group.finish();
}

fn bench_auto_arima(c: &mut Criterion) {
    let mut group = c.benchmark_group("Auto ARIMA");
    group.sample_size(10); // Reduce sample size for slower benchmarks

    let values = create_series(120, 42);
    for max_order in [1, 2, 3].iter() {
        group.bench_with_input(
            BenchmarkId::new("non_seasonal", max_order),
            &values,
            |b, values| {
                b.iter(|| {
                    let mut auto = AutoArima::with_search(ArimaSearch {
                        max_p: *max_order,
                        max_q: *max_order,
                        ..ArimaSearch::default()
                    });
                    auto.fit(std::hint::black_box(values)).unwrap();
                });
            },
        );
    }

    group.bench_with_input(BenchmarkId::new("seasonal", 12), &values, |b, values| {
        b.iter(|| {
            let mut auto = AutoArima::with_search(ArimaSearch {
                max_p: 1,
                max_q: 1,
                max_seasonal_p: 1,
                max_seasonal_q: 1,
                ..ArimaSearch::default()
            })
            .seasonal(12);
            auto.fit(std::hint::black_box(values)).unwrap();
        });
    });

    group.finish();
}

fn bench_linear_regression(c: &mut Criterion) {
    let mut group = c.benchmark_group("Linear Regression");

    for n_features in [2, 8].iter() {
        let panel = create_panel(240, *n_features);
        let features: Vec<String> = (0..*n_features).map(|f| format!("feature_{}", f)).collect();

        group.bench_with_input(BenchmarkId::new("fit", n_features), &panel, |b, panel| {
            let names: Vec<&str> = features.iter().map(String::as_str).collect();
            b.iter(|| {
                let mut model = LinearRegression::new();
                model
                    .fit(std::hint::black_box(panel), "target", &names)
                    .unwrap();
            });
        });
    }

    group.finish();
}

criterion_group!(benches, bench_sarima, bench_auto_arima, bench_linear_regression);
criterion_main!(benches);
