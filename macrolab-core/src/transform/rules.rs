//! Normalization rules and the rule table.
//!
//! A rule table maps each series to exactly one rule. Series without an entry
//! use [`NormalizationRule::Identity`]. Because a series carries a single rule,
//! resampling and percent-change never compose on the same series.

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::SeriesId;

/// Target cadence of a resample rule. Buckets are calendar periods labelled by
/// their last day.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Frequency {
    Monthly,
    Quarterly,
    Annual,
}

impl Frequency {
    /// Number of calendar months in one period.
    pub fn months(self) -> u32 {
        match self {
            Frequency::Monthly => 1,
            Frequency::Quarterly => 3,
            Frequency::Annual => 12,
        }
    }

    /// Last day of the period containing `date`.
    pub fn period_end(self, date: NaiveDate) -> NaiveDate {
        let span = self.months();
        let month0 = date.month0();
        let first_month0 = month0 - month0 % span;
        NaiveDate::from_ymd_opt(date.year(), first_month0 + 1, 1)
            .and_then(|start| start.checked_add_months(Months::new(span)))
            .and_then(|next| next.pred_opt())
            .unwrap_or(NaiveDate::MAX)
    }
}

/// Per-series normalization.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum NormalizationRule {
    /// Pass through unchanged.
    #[default]
    Identity,

    /// Sum sub-period observations (e.g. weekly claims) into calendar periods.
    ResampleSum { frequency: Frequency },

    /// `(v[t] - v[t-12]) / v[t-12] * 100`, lagging by 12 *positions* in the
    /// sorted series. Only meaningful for monthly series without gaps; the
    /// transformer does not check cadence.
    YoyPercentChange,
}

impl NormalizationRule {
    /// Execution order: resampling changes cadence, so it runs before
    /// percent-change rules.
    pub fn stage(&self) -> u8 {
        match self {
            NormalizationRule::Identity => 0,
            NormalizationRule::ResampleSum { .. } => 1,
            NormalizationRule::YoyPercentChange => 2,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            NormalizationRule::Identity => "identity",
            NormalizationRule::ResampleSum { .. } => "resample_sum",
            NormalizationRule::YoyPercentChange => "yoy_percent_change",
        }
    }
}

/// Mapping `series_id -> rule`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RuleTable {
    rules: BTreeMap<SeriesId, NormalizationRule>,
}

impl RuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Rules used by the production FRED pipeline: weekly initial claims are
    /// summed to months, the CPI/PCE price indices become YoY inflation.
    pub fn default_fred() -> Self {
        let mut table = Self::new();
        table.insert(
            "ICSA",
            NormalizationRule::ResampleSum {
                frequency: Frequency::Monthly,
            },
        );
        for id in ["CPIAUCSL", "CPILFESL", "PCEPILFE"] {
            table.insert(id, NormalizationRule::YoyPercentChange);
        }
        table
    }

    /// Set the rule for a series, replacing any previous one.
    pub fn insert(&mut self, series_id: impl Into<SeriesId>, rule: NormalizationRule) -> Option<NormalizationRule> {
        self.rules.insert(series_id.into(), rule)
    }

    /// Rule for `series_id`, defaulting to identity.
    pub fn rule_for(&self, series_id: &SeriesId) -> NormalizationRule {
        self.rules.get(series_id).copied().unwrap_or_default()
    }

    /// Series that have an explicit rule.
    pub fn series_ids(&self) -> impl Iterator<Item = &SeriesId> {
        self.rules.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesId, &NormalizationRule)> {
        self.rules.iter()
    }

    /// Explicit rules ordered by stage, then series id.
    pub fn in_stage_order(&self) -> Vec<(&SeriesId, NormalizationRule)> {
        let mut ordered: Vec<(&SeriesId, NormalizationRule)> =
            self.rules.iter().map(|(id, rule)| (id, *rule)).collect();
        ordered.sort_by_key(|(id, rule)| (rule.stage(), (*id).clone()));
        ordered
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
