//! Lookback windows.

use chrono::{Months, NaiveDate};
use serde::{Deserialize, Serialize};

use super::TransformError;
use crate::domain::Series;

/// Inclusive calendar range `[start, end]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl Window {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    /// `[as_of - months, as_of]`. Month subtraction clamps the day to the end
    /// of the target month (31 March minus one month is 28/29 February).
    pub fn lookback(as_of: NaiveDate, months: u32) -> Result<Self, TransformError> {
        let start = as_of
            .checked_sub_months(Months::new(months))
            .ok_or(TransformError::InvalidLookback { months })?;
        Ok(Self { start, end: as_of })
    }

    /// Same end, start moved `months` further back.
    pub fn extend_back(&self, months: u32) -> Result<Self, TransformError> {
        let start = self
            .start
            .checked_sub_months(Months::new(months))
            .ok_or(TransformError::InvalidLookback { months })?;
        Ok(Self { start, end: self.end })
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Points of `series` that fall inside the window.
    pub fn apply(&self, series: &Series) -> Series {
        let points = series.points();
        let lo = points.partition_point(|(d, _)| *d < self.start);
        let hi = points.partition_point(|(d, _)| *d <= self.end);
        if lo >= hi {
            return Series::default();
        }
        Series::from_ordered(points[lo..hi].to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::DuplicatePolicy;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn lookback_subtracts_calendar_months() {
        let w = Window::lookback(d(2023, 2, 15), 1).unwrap();
        assert_eq!(w.start, d(2023, 1, 15));
        assert_eq!(w.end, d(2023, 2, 15));
    }

    #[test]
    fn lookback_clamps_to_month_end() {
        let w = Window::lookback(d(2023, 3, 31), 1).unwrap();
        assert_eq!(w.start, d(2023, 2, 28));
    }

    #[test]
    fn zero_lookback_is_a_single_day() {
        let w = Window::lookback(d(2023, 3, 31), 0).unwrap();
        assert_eq!(w.start, w.end);
    }

    #[test]
    fn bounds_are_inclusive() {
        let w = Window::new(d(2023, 1, 1), d(2023, 3, 1));
        let s = Series::from_unsorted(
            vec![
                (d(2022, 12, 1), Some(0.0)),
                (d(2023, 1, 1), Some(1.0)),
                (d(2023, 2, 1), Some(2.0)),
                (d(2023, 3, 1), Some(3.0)),
                (d(2023, 4, 1), Some(4.0)),
            ],
            DuplicatePolicy::KeepLast,
        )
        .unwrap();

        let sliced = w.apply(&s);
        assert_eq!(sliced.len(), 3);
        assert_eq!(sliced.first_date(), Some(d(2023, 1, 1)));
        assert_eq!(sliced.last_date(), Some(d(2023, 3, 1)));
    }

    #[test]
    fn series_outside_window_becomes_empty() {
        let w = Window::new(d(2024, 1, 1), d(2024, 12, 31));
        let s = Series::from_unsorted(vec![(d(2020, 1, 1), Some(1.0))], DuplicatePolicy::KeepLast).unwrap();
        assert!(w.apply(&s).is_empty());
    }

    #[test]
    fn extend_back_keeps_end() {
        let w = Window::lookback(d(2025, 6, 30), 12).unwrap().extend_back(12).unwrap();
        assert_eq!(w.start, d(2023, 6, 30));
        assert_eq!(w.end, d(2025, 6, 30));
    }
}
