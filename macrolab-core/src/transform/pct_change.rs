//! Percent change against a lagged observation.

use crate::domain::Series;

/// Lag of the year-over-year rule, in observations.
pub const YOY_LAG: usize = 12;

/// `(v[i] - v[i-periods]) / v[i-periods] * 100` for every `i >= periods`.
///
/// The lag is counted in positions of the sorted series, not in calendar
/// time. The first `periods` points have no base and are dropped. A null on
/// either side, or a zero base, yields a null.
pub fn percent_change(series: &Series, periods: usize) -> Series {
    let points = series.points();
    let out = points
        .iter()
        .enumerate()
        .skip(periods)
        .map(|(i, (date, value))| (*date, pct(*value, points[i - periods].1)))
        .collect();
    Series::from_ordered(out)
}

/// Year-over-year percent change of a monthly series.
pub fn yoy_percent_change(series: &Series) -> Series {
    percent_change(series, YOY_LAG)
}

fn pct(current: Option<f64>, base: Option<f64>) -> Option<f64> {
    match (current, base) {
        (Some(c), Some(b)) if b != 0.0 => {
            let change = (c - b) / b * 100.0;
            change.is_finite().then_some(change)
        }
        _ => None,
    }
}
