//! Observation — the fundamental economic data unit.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of an economic series (e.g. `UNRATE`, `CPIAUCSL`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SeriesId(pub String);

impl SeriesId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SeriesId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for SeriesId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

impl From<String> for SeriesId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// One dated value of one series.
///
/// `value` is `None` when the provider reported a missing value. Nulls are
/// carried through the transform rather than dropped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub series_id: SeriesId,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, series_id: impl Into<SeriesId>, value: Option<f64>) -> Self {
        Self {
            date,
            series_id: series_id.into(),
            value,
        }
    }
}
