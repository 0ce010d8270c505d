//! Calendar-period aggregation by summation.

use chrono::NaiveDate;
use std::collections::BTreeMap;

use super::rules::Frequency;
use crate::domain::Series;

/// Sum every observation into its calendar period, labelled by the period's
/// last day.
///
/// Every period between the first and the last observation is emitted, so a
/// gap period appears with a sum of `0.0`. Null values contribute nothing.
pub fn resample_sum(series: &Series, frequency: Frequency) -> Series {
    let (Some(first), Some(last)) = (series.first_date(), series.last_date()) else {
        return Series::default();
    };

    let mut sums: BTreeMap<NaiveDate, f64> = BTreeMap::new();
    for (date, value) in series.points() {
        let bucket = sums.entry(frequency.period_end(*date)).or_insert(0.0);
        if let Some(v) = value {
            *bucket += v;
        }
    }

    let last_end = frequency.period_end(last);
    let mut out = Vec::new();
    let mut end = frequency.period_end(first);
    loop {
        out.push((end, Some(sums.get(&end).copied().unwrap_or(0.0))));
        if end >= last_end {
            break;
        }
        match end.succ_opt() {
            Some(next) => end = frequency.period_end(next),
            None => break,
        }
    }

    Series::from_ordered(out)
}
