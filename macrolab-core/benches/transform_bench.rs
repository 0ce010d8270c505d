//! Criterion benchmarks for the transform hot paths.
//!
//! Benchmarks:
//! 1. Catalog build (grouping + sort + dedup of raw records)
//! 2. Individual rules (resample-sum, YoY percent change)
//! 3. Full transformer run with the default dashboard rules

use chrono::{Duration, NaiveDate};
use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};

use macrolab_core::domain::{DuplicatePolicy, Observation, Series};
use macrolab_core::transform::{
    resample_sum, yoy_percent_change, Frequency, RuleTable, SeriesCatalog, SeriesTransformer, Window,
};

// ── Helpers ──────────────────────────────────────────────────────────

const SERIES: [&str; 6] = ["CPIAUCSL", "CPILFESL", "PCEPILFE", "ICSA", "GS10", "UNRATE"];

fn make_raw(days: usize) -> Vec<Observation> {
    let base = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let mut raw = Vec::with_capacity(days * SERIES.len());
    for (s, id) in SERIES.iter().enumerate() {
        for i in 0..days {
            let value = 100.0 + (i as f64 * 0.01 + s as f64).sin() * 10.0;
            raw.push(Observation::new(base + Duration::days(i as i64), *id, Some(value)));
        }
    }
    raw
}

fn make_series(days: usize) -> Series {
    let base = NaiveDate::from_ymd_opt(1990, 1, 1).unwrap();
    let points = (0..days)
        .map(|i| (base + Duration::days(i as i64), Some(100.0 + i as f64 * 0.01)))
        .collect();
    Series::from_unsorted(points, DuplicatePolicy::KeepLast).unwrap()
}

// ── Benchmarks ───────────────────────────────────────────────────────

fn bench_catalog(c: &mut Criterion) {
    let mut group = c.benchmark_group("catalog");
    for days in [1_000usize, 10_000] {
        let raw = make_raw(days);
        group.bench_with_input(BenchmarkId::new("from_observations", days), &raw, |b, raw| {
            b.iter(|| SeriesCatalog::from_observations(black_box(raw), DuplicatePolicy::KeepLast).unwrap())
        });
    }
    group.finish();
}

fn bench_rules(c: &mut Criterion) {
    let mut group = c.benchmark_group("rules");
    let series = make_series(12_000);

    group.bench_function("resample_sum_monthly_12000", |b| {
        b.iter(|| resample_sum(black_box(&series), Frequency::Monthly))
    });
    group.bench_function("yoy_percent_change_12000", |b| {
        b.iter(|| yoy_percent_change(black_box(&series)))
    });

    group.finish();
}

fn bench_transformer(c: &mut Criterion) {
    let mut group = c.benchmark_group("transformer");
    let transformer = SeriesTransformer::new(RuleTable::default_fred());
    let window = Window::new(
        NaiveDate::from_ymd_opt(2010, 1, 1).unwrap(),
        NaiveDate::from_ymd_opt(2020, 1, 1).unwrap(),
    );

    for days in [1_000usize, 10_000] {
        let raw = make_raw(days);
        group.bench_with_input(BenchmarkId::new("default_rules", days), &raw, |b, raw| {
            b.iter(|| transformer.run(black_box(raw), window).unwrap())
        });
    }
    group.finish();
}

criterion_group!(benches, bench_catalog, bench_rules, bench_transformer);
criterion_main!(benches);
