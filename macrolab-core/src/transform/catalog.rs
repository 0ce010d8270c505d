//! Series catalog — raw records grouped by series.

use std::collections::BTreeMap;

use super::TransformError;
use crate::domain::{DuplicatePolicy, Observation, Point, Series, SeriesId};

/// Mapping `series_id -> Series`, built from a raw record set.
///
/// Iteration is in ascending series id order, which makes the flattened
/// output deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesCatalog {
    series: BTreeMap<SeriesId, Series>,
}

impl SeriesCatalog {
    /// Group observations by series id; sort and deduplicate each group.
    pub fn from_observations(raw: &[Observation], policy: DuplicatePolicy) -> Result<Self, TransformError> {
        let mut grouped: BTreeMap<SeriesId, Vec<Point>> = BTreeMap::new();
        for obs in raw {
            grouped
                .entry(obs.series_id.clone())
                .or_default()
                .push((obs.date, obs.value));
        }

        let mut series = BTreeMap::new();
        for (series_id, points) in grouped {
            let built = Series::from_unsorted(points, policy).map_err(|dup| {
                TransformError::DuplicateObservation {
                    series_id: series_id.clone(),
                    date: dup.date,
                }
            })?;
            series.insert(series_id, built);
        }

        Ok(Self { series })
    }

    pub fn get(&self, series_id: &SeriesId) -> Option<&Series> {
        self.series.get(series_id)
    }

    pub fn contains(&self, series_id: &SeriesId) -> bool {
        self.series.contains_key(series_id)
    }

    /// Replace the series stored under `series_id`.
    pub fn insert(&mut self, series_id: SeriesId, series: Series) -> Option<Series> {
        self.series.insert(series_id, series)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&SeriesId, &Series)> {
        self.series.iter()
    }

    pub fn series_ids(&self) -> impl Iterator<Item = &SeriesId> {
        self.series.keys()
    }

    pub fn len(&self) -> usize {
        self.series.len()
    }

    pub fn is_empty(&self) -> bool {
        self.series.is_empty()
    }

    /// Total number of points across all series.
    pub fn point_count(&self) -> usize {
        self.series.values().map(Series::len).sum()
    }

    /// Re-expand into `(date, series_id, value)` rows, one block per series.
    pub fn flatten(&self) -> Vec<Observation> {
        let mut out = Vec::with_capacity(self.point_count());
        for (series_id, series) in &self.series {
            out.extend(series.to_observations(series_id));
        }
        out
    }
}
