//! Series transformer: raw observations -> normalized, windowed panel.
//!
//! Steps, in order:
//! 1. group the raw record set into a [`SeriesCatalog`] (sorted, deduplicated)
//! 2. apply each series' [`NormalizationRule`], resample rules before
//!    percent-change rules
//! 3. keep only points inside the run's [`Window`]
//! 4. flatten back into `(date, series_id, value)` rows
//!
//! Validation (empty input, rules naming absent series) happens before any
//! output is built, so a failed run yields nothing.

pub mod catalog;
pub mod pct_change;
pub mod resample;
pub mod rules;
pub mod window;

pub use catalog::SeriesCatalog;
pub use pct_change::{percent_change, yoy_percent_change, YOY_LAG};
pub use resample::resample_sum;
pub use rules::{Frequency, NormalizationRule, RuleTable};
pub use window::Window;

use chrono::NaiveDate;
use thiserror::Error;
use tracing::debug;

use crate::domain::{DuplicatePolicy, Observation, Series, SeriesId};

/// Errors from the transform stage.
#[derive(Debug, Error)]
pub enum TransformError {
    #[error("raw record set is empty")]
    EmptyInput,

    #[error("normalization rule references series '{series_id}' which is absent from the raw data")]
    MissingSeries { series_id: SeriesId },

    #[error("duplicate observation for series '{series_id}' on {date}")]
    DuplicateObservation { series_id: SeriesId, date: NaiveDate },

    #[error("lookback of {months} months is out of the representable date range")]
    InvalidLookback { months: u32 },
}

/// Per-series counts for one transform run.
#[derive(Debug, Clone, PartialEq)]
pub struct SeriesSummary {
    pub series_id: SeriesId,
    pub rule: NormalizationRule,
    /// Unique dates after grouping.
    pub raw_points: usize,
    /// Points after normalization.
    pub normalized_points: usize,
    /// Points after windowing.
    pub output_points: usize,
}

/// Result of a transform run.
#[derive(Debug, Clone)]
pub struct TransformOutput {
    pub window: Window,
    pub records: Vec<Observation>,
    pub summaries: Vec<SeriesSummary>,
}

/// Rule table plus duplicate-handling policy.
#[derive(Debug, Clone, Default)]
pub struct SeriesTransformer {
    rules: RuleTable,
    duplicate_policy: DuplicatePolicy,
}

impl SeriesTransformer {
    pub fn new(rules: RuleTable) -> Self {
        Self {
            rules,
            duplicate_policy: DuplicatePolicy::default(),
        }
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.duplicate_policy = policy;
        self
    }

    pub fn rules(&self) -> &RuleTable {
        &self.rules
    }

    /// Run the full transform over `raw` for `window`.
    pub fn run(&self, raw: &[Observation], window: Window) -> Result<TransformOutput, TransformError> {
        if raw.is_empty() {
            return Err(TransformError::EmptyInput);
        }

        let catalog = SeriesCatalog::from_observations(raw, self.duplicate_policy)?;

        if let Some(missing) = self.rules.series_ids().find(|id| !catalog.contains(id)) {
            return Err(TransformError::MissingSeries {
                series_id: missing.clone(),
            });
        }

        let normalized = self.normalize(&catalog);

        let mut windowed = SeriesCatalog::default();
        let mut summaries = Vec::with_capacity(normalized.len());
        for (series_id, series) in normalized.iter() {
            let sliced = window.apply(series);
            summaries.push(SeriesSummary {
                series_id: series_id.clone(),
                rule: self.rules.rule_for(series_id),
                raw_points: catalog.get(series_id).map_or(0, Series::len),
                normalized_points: series.len(),
                output_points: sliced.len(),
            });
            windowed.insert(series_id.clone(), sliced);
        }

        let records = windowed.flatten();
        debug!(
            series = windowed.len(),
            records = records.len(),
            start = %window.start,
            end = %window.end,
            "transform complete"
        );

        Ok(TransformOutput {
            window,
            records,
            summaries,
        })
    }

    /// Apply explicit rules in stage order; identity series are untouched.
    fn normalize(&self, catalog: &SeriesCatalog) -> SeriesCatalog {
        let mut out = catalog.clone();
        for (series_id, rule) in self.rules.in_stage_order() {
            let Some(series) = out.get(series_id) else {
                continue;
            };
            let normalized = apply_rule(series, rule);
            debug!(
                series_id = %series_id,
                rule = rule.label(),
                before = series.len(),
                after = normalized.len(),
                "normalized series"
            );
            out.insert(series_id.clone(), normalized);
        }
        out
    }
}

/// Apply a single rule to a single series.
pub fn apply_rule(series: &Series, rule: NormalizationRule) -> Series {
    match rule {
        NormalizationRule::Identity => series.clone(),
        NormalizationRule::ResampleSum { frequency } => resample_sum(series, frequency),
        NormalizationRule::YoyPercentChange => yoy_percent_change(series),
    }
}

/// Transform `raw` into the processed record set for `window`.
pub fn transform(raw: &[Observation], window: Window, rules: &RuleTable) -> Result<Vec<Observation>, TransformError> {
    SeriesTransformer::new(rules.clone())
        .run(raw, window)
        .map(|out| out.records)
}

/// Like [`transform`], with the window `[as_of - lookback_months, as_of]`.
pub fn transform_as_of(
    raw: &[Observation],
    lookback_months: u32,
    as_of: NaiveDate,
    rules: &RuleTable,
) -> Result<Vec<Observation>, TransformError> {
    let window = Window::lookback(as_of, lookback_months)?;
    transform(raw, window, rules)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Months;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    fn obs(date: NaiveDate, id: &str, value: Option<f64>) -> Observation {
        Observation::new(date, id, value)
    }

    #[test]
    fn unrate_one_month_window_keeps_only_february() {
        let raw = vec![
            obs(d(2023, 1, 1), "UNRATE", Some(3.4)),
            obs(d(2023, 2, 1), "UNRATE", Some(3.6)),
        ];
        let out = transform_as_of(&raw, 1, d(2023, 2, 15), &RuleTable::new()).unwrap();

        assert_eq!(out, vec![obs(d(2023, 2, 1), "UNRATE", Some(3.6))]);
    }

    #[test]
    fn empty_input_fails() {
        let err = transform_as_of(&[], 12, d(2023, 2, 15), &RuleTable::new()).unwrap_err();
        assert!(matches!(err, TransformError::EmptyInput));
    }

    #[test]
    fn rule_for_absent_series_fails() {
        let raw = vec![obs(d(2023, 1, 1), "UNRATE", Some(3.4))];
        let mut rules = RuleTable::new();
        rules.insert("XYZ", NormalizationRule::YoyPercentChange);

        let err = transform_as_of(&raw, 12, d(2023, 2, 15), &rules).unwrap_err();
        match err {
            TransformError::MissingSeries { series_id } => assert_eq!(series_id.as_str(), "XYZ"),
            other => panic!("expected MissingSeries, got {other:?}"),
        }
    }

    #[test]
    fn yoy_series_is_windowed_on_normalized_dates() {
        let start = d(2021, 1, 1);
        let raw: Vec<Observation> = (0..36u32)
            .map(|i| obs(start + Months::new(i), "CPIAUCSL", Some(100.0 + i as f64)))
            .collect();
        let mut rules = RuleTable::new();
        rules.insert("CPIAUCSL", NormalizationRule::YoyPercentChange);

        // Window covers all of 2021..2023; YoY output only starts in 2022.
        let window = Window::new(d(2021, 1, 1), d(2023, 12, 31));
        let out = SeriesTransformer::new(rules).run(&raw, window).unwrap();

        assert_eq!(out.records.len(), 24);
        assert_eq!(out.records[0].date, d(2022, 1, 1));
        assert_eq!(out.summaries[0].raw_points, 36);
        assert_eq!(out.summaries[0].normalized_points, 24);
    }

    #[test]
    fn resampled_month_end_after_as_of_is_outside_window() {
        let raw = vec![
            obs(d(2023, 1, 7), "ICSA", Some(200.0)),
            obs(d(2023, 1, 14), "ICSA", Some(210.0)),
            obs(d(2023, 2, 4), "ICSA", Some(190.0)),
        ];
        let mut rules = RuleTable::new();
        rules.insert(
            "ICSA",
            NormalizationRule::ResampleSum {
                frequency: Frequency::Monthly,
            },
        );

        let out = transform_as_of(&raw, 3, d(2023, 2, 15), &rules).unwrap();
        // February's bucket is labelled 2023-02-28, past the as-of date.
        assert_eq!(out, vec![obs(d(2023, 1, 31), "ICSA", Some(410.0))]);
    }

    #[test]
    fn series_emptied_by_window_contributes_nothing() {
        let raw = vec![
            obs(d(2010, 1, 1), "TEDRATE", Some(0.2)),
            obs(d(2023, 2, 1), "UNRATE", Some(3.6)),
        ];
        let out = SeriesTransformer::default()
            .run(&raw, Window::lookback(d(2023, 2, 15), 12).unwrap())
            .unwrap();

        assert_eq!(out.records.len(), 1);
        let ted = out.summaries.iter().find(|s| s.series_id.as_str() == "TEDRATE").unwrap();
        assert_eq!(ted.output_points, 0);
    }

    #[test]
    fn null_values_pass_through_identity() {
        let raw = vec![obs(d(2023, 2, 1), "VIXCLS", None)];
        let out = transform_as_of(&raw, 1, d(2023, 2, 15), &RuleTable::new()).unwrap();
        assert_eq!(out, vec![obs(d(2023, 2, 1), "VIXCLS", None)]);
    }

    #[test]
    fn duplicate_policy_is_applied_before_rules() {
        let raw = vec![
            obs(d(2023, 2, 1), "UNRATE", Some(3.6)),
            obs(d(2023, 2, 1), "UNRATE", Some(3.7)),
        ];
        let window = Window::lookback(d(2023, 2, 15), 1).unwrap();

        let last = SeriesTransformer::default().run(&raw, window).unwrap();
        assert_eq!(last.records[0].value, Some(3.7));

        let first = SeriesTransformer::default()
            .with_duplicate_policy(DuplicatePolicy::KeepFirst)
            .run(&raw, window)
            .unwrap();
        assert_eq!(first.records[0].value, Some(3.6));

        let rejected = SeriesTransformer::default()
            .with_duplicate_policy(DuplicatePolicy::Reject)
            .run(&raw, window);
        assert!(matches!(rejected, Err(TransformError::DuplicateObservation { .. })));
    }
}
