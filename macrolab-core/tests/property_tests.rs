//! Property tests for transform invariants.
//!
//! Uses proptest to verify:
//! 1. Identity preserves point count (unique dates per series)
//! 2. Monthly resample-sum: one bucket per spanned month, bucket = month sum
//! 3. YoY over N monthly points yields N - 12 points with the exact formula
//! 4. Windowing is idempotent
//! 5. Flatten then regroup reconstructs the catalog

use chrono::{Datelike, Months, NaiveDate};
use macrolab_core::domain::{DuplicatePolicy, Observation, Series, SeriesId};
use macrolab_core::transform::{
    resample_sum, yoy_percent_change, Frequency, RuleTable, SeriesCatalog, SeriesTransformer, Window,
};
use proptest::prelude::*;
use std::collections::BTreeSet;

// ── Strategies (proptest) ────────────────────────────────────────────

fn base_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2015, 1, 1).unwrap()
}

fn arb_day_offsets() -> impl Strategy<Value = Vec<u32>> {
    prop::collection::vec(0u32..3000, 1..80)
}

fn arb_value() -> impl Strategy<Value = Option<f64>> {
    prop_oneof![
        9 => (-1000.0..1000.0_f64).prop_map(|v| Some((v * 100.0).round() / 100.0)),
        1 => Just(None),
    ]
}

fn arb_raw_records() -> impl Strategy<Value = Vec<Observation>> {
    let ids = prop::sample::select(vec!["GS10", "UNRATE", "ICSA", "VIXCLS"]);
    prop::collection::vec((ids, 0u32..3000, arb_value()), 1..150).prop_map(|rows| {
        rows.into_iter()
            .map(|(id, offset, value)| {
                Observation::new(base_date() + chrono::Duration::days(offset as i64), id, value)
            })
            .collect()
    })
}

fn series_from_offsets(offsets: &[u32], value: f64) -> Series {
    let points = offsets
        .iter()
        .map(|o| (base_date() + chrono::Duration::days(*o as i64), Some(value)))
        .collect();
    Series::from_unsorted(points, DuplicatePolicy::KeepLast).unwrap()
}

fn months_spanned(first: NaiveDate, last: NaiveDate) -> usize {
    ((last.year() - first.year()) * 12 + last.month() as i32 - first.month() as i32 + 1) as usize
}

// ── 1. Identity count ────────────────────────────────────────────────

proptest! {
    /// With no rules and a window covering everything, each series keeps one
    /// row per unique date.
    #[test]
    fn identity_preserves_unique_date_count(raw in arb_raw_records()) {
        let window = Window::new(base_date(), base_date() + chrono::Duration::days(4000));
        let out = SeriesTransformer::new(RuleTable::new()).run(&raw, window).unwrap();

        for summary in &out.summaries {
            let unique: BTreeSet<NaiveDate> = raw
                .iter()
                .filter(|o| o.series_id == summary.series_id)
                .map(|o| o.date)
                .collect();
            prop_assert_eq!(summary.output_points, unique.len());
        }
        prop_assert_eq!(out.records.len(), out.summaries.iter().map(|s| s.output_points).sum::<usize>());
    }
}

// ── 2. Resample-sum ──────────────────────────────────────────────────

proptest! {
    #[test]
    fn monthly_resample_has_one_bucket_per_spanned_month(offsets in arb_day_offsets()) {
        let series = series_from_offsets(&offsets, 1.0);
        let monthly = resample_sum(&series, Frequency::Monthly);

        let first = series.first_date().unwrap();
        let last = series.last_date().unwrap();
        prop_assert_eq!(monthly.len(), months_spanned(first, last));

        // With every value 1.0, each bucket counts that month's observations.
        for (end, sum) in monthly.points() {
            let count = series
                .points()
                .iter()
                .filter(|(d, _)| d.year() == end.year() && d.month() == end.month())
                .count();
            prop_assert_eq!(sum.unwrap(), count as f64);
        }
    }
}

// ── 3. YoY ───────────────────────────────────────────────────────────

proptest! {
    #[test]
    fn yoy_matches_formula(values in prop::collection::vec(1.0..500.0_f64, 13..48)) {
        let points = values
            .iter()
            .enumerate()
            .map(|(i, v)| (base_date() + Months::new(i as u32), Some(*v)))
            .collect();
        let series = Series::from_unsorted(points, DuplicatePolicy::KeepLast).unwrap();
        let yoy = yoy_percent_change(&series);

        prop_assert_eq!(yoy.len(), values.len() - 12);
        for (k, (_, pct)) in yoy.points().iter().enumerate() {
            let i = k + 12;
            let expected = (values[i] - values[i - 12]) / values[i - 12] * 100.0;
            prop_assert!((pct.unwrap() - expected).abs() < 1e-9);
        }
    }
}

// ── 4. Window idempotence ────────────────────────────────────────────

proptest! {
    #[test]
    fn windowing_twice_equals_windowing_once(
        offsets in arb_day_offsets(),
        start in 0u32..3000,
        len in 0u32..1500,
    ) {
        let series = series_from_offsets(&offsets, 2.5);
        let window = Window::new(
            base_date() + chrono::Duration::days(start as i64),
            base_date() + chrono::Duration::days((start + len) as i64),
        );

        let once = window.apply(&series);
        let twice = window.apply(&once);
        prop_assert_eq!(once, twice);
    }
}

// ── 5. Flatten / regroup round trip ──────────────────────────────────

proptest! {
    #[test]
    fn flatten_then_regroup_reconstructs_catalog(raw in arb_raw_records()) {
        let catalog = SeriesCatalog::from_observations(&raw, DuplicatePolicy::KeepLast).unwrap();
        let flat = catalog.flatten();
        let regrouped = SeriesCatalog::from_observations(&flat, DuplicatePolicy::Reject).unwrap();

        prop_assert_eq!(&regrouped, &catalog);
        let ids: Vec<&SeriesId> = regrouped.series_ids().collect();
        prop_assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }
}
