//! Benchmarks for seasonal model fitting.

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use towt::config::TowtConfig;
use towt::core::Observation;
use towt::pipeline;
use towt::regression::SeasonalRegressionEngine;

fn generate_account(account: &str, days: i64) -> Vec<Observation> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 2).unwrap();
    let mut rows = Vec::with_capacity(days as usize * 24);
    for day in 0..days {
        let date = start + Duration::days(day);
        for hour in 0..24u32 {
            let temp = 40.0 + 30.0 * ((day % 30) as f64 / 30.0) + (hour as f64 - 12.0).abs();
            let usage = 2.0 + 0.05 * temp + (hour % 6) as f64 * 0.3;
            rows.push(
                Observation::new(account, date, temp, usage)
                    .with_hour(hour)
                    .with_season("1")
                    .with_treatment(day >= days * 3 / 4),
            );
        }
    }
    rows
}

fn bench_fit_account(c: &mut Criterion) {
    let mut group = c.benchmark_group("fit_account");
    let engine = SeasonalRegressionEngine::new(TowtConfig::default().model);

    for days in [28i64, 56, 112].iter() {
        let rows = generate_account("bench", *days);
        let refs: Vec<&Observation> = rows.iter().collect();
        group.bench_with_input(BenchmarkId::new("hourly", days), days, |b, _| {
            b.iter(|| engine.run_account("bench", black_box(&refs)))
        });
    }

    group.finish();
}

fn bench_batch(c: &mut Criterion) {
    let config = TowtConfig::default();
    let observations: Vec<Observation> = (0..16)
        .flat_map(|i| generate_account(&format!("acct-{:02}", i), 28))
        .collect();

    c.bench_function("batch_16_accounts", |b| {
        b.iter(|| pipeline::run(black_box(&observations), &config))
    });
}

criterion_group!(benches, bench_fit_account, bench_batch);
criterion_main!(benches);
