//! Series — one named, date-ordered sequence of observations.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::observation::{Observation, SeriesId};

/// A single dated point of a series.
pub type Point = (NaiveDate, Option<f64>);

/// How to resolve two raw observations of the same series on the same date.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicatePolicy {
    /// The observation that appears later in the raw record set wins.
    #[default]
    KeepLast,
    /// The observation that appears first in the raw record set wins.
    KeepFirst,
    /// Any duplicate date is an error.
    Reject,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("duplicate observation on {date}")]
pub struct DuplicateDate {
    pub date: NaiveDate,
}

/// Date-ordered, date-unique mapping from date to value.
///
/// Dates are strictly increasing. The only public constructor sorts and
/// deduplicates, so every `Series` in the crate upholds this.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Series {
    points: Vec<Point>,
}

impl Series {
    /// Build a series from unsorted points, resolving duplicate dates per `policy`.
    ///
    /// The sort is stable, so "first" and "last" refer to input order.
    pub fn from_unsorted(mut points: Vec<Point>, policy: DuplicatePolicy) -> Result<Self, DuplicateDate> {
        points.sort_by_key(|(date, _)| *date);

        let mut out: Vec<Point> = Vec::with_capacity(points.len());
        for (date, value) in points {
            match out.last_mut() {
                Some(last) if last.0 == date => match policy {
                    DuplicatePolicy::KeepLast => last.1 = value,
                    DuplicatePolicy::KeepFirst => {}
                    DuplicatePolicy::Reject => return Err(DuplicateDate { date }),
                },
                _ => out.push((date, value)),
            }
        }

        Ok(Self { points: out })
    }

    /// Wrap points that are already strictly increasing by date.
    pub(crate) fn from_ordered(points: Vec<Point>) -> Self {
        debug_assert!(
            points.windows(2).all(|w| w[0].0 < w[1].0),
            "series points must be strictly increasing by date"
        );
        Self { points }
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first_date(&self) -> Option<NaiveDate> {
        self.points.first().map(|(d, _)| *d)
    }

    pub fn last_date(&self) -> Option<NaiveDate> {
        self.points.last().map(|(d, _)| *d)
    }

    /// Value on `date`. Outer `None` means no point on that date; inner `None`
    /// means the provider reported a missing value.
    pub fn get(&self, date: NaiveDate) -> Option<Option<f64>> {
        self.points
            .binary_search_by_key(&date, |(d, _)| *d)
            .ok()
            .map(|i| self.points[i].1)
    }

    /// Expand back into observations tagged with `series_id`.
    pub fn to_observations(&self, series_id: &SeriesId) -> Vec<Observation> {
        self.points
            .iter()
            .map(|(date, value)| Observation {
                date: *date,
                series_id: series_id.clone(),
                value: *value,
            })
            .collect()
    }
}
