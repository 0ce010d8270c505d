//! Series universe — category-organized FRED series lists.
//!
//! The universe is loaded as part of the pipeline TOML config, as a table of
//! categories and their member series.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::domain::SeriesId;

/// The set of economic series a pipeline run fetches, grouped by category.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeriesUniverse {
    pub categories: BTreeMap<String, Vec<String>>,
}

impl SeriesUniverse {
    /// Every series across all categories, deduplicated, in category order.
    pub fn all_series(&self) -> Vec<SeriesId> {
        let mut seen = std::collections::BTreeSet::new();
        self.categories
            .values()
            .flatten()
            .filter(|id| seen.insert(id.as_str()))
            .map(|id| SeriesId::from(id.as_str()))
            .collect()
    }

    pub fn contains(&self, series_id: &SeriesId) -> bool {
        self.categories.values().flatten().any(|id| id == series_id.as_str())
    }

    pub fn series_count(&self) -> usize {
        self.all_series().len()
    }

    /// The macro dashboard's standard series set.
    pub fn default_fred() -> Self {
        let mut categories = BTreeMap::new();

        let mut add = |name: &str, ids: &[&str]| {
            categories.insert(name.to_string(), ids.iter().map(|s| s.to_string()).collect::<Vec<_>>());
        };

        add("Yield Curve & Rates", &["T10Y3M", "GS10", "TB3MS", "FEDFUNDS"]);
        add("Labor Market", &["UNRATE", "PAYEMS", "ICSA", "AHETPI"]);
        add("Inflation & Prices", &["CPIAUCSL", "CPILFESL", "PCEPILFE"]);
        add("Production & Growth", &["GDPC1", "INDPRO", "HOUST"]);
        add("Credit & Risk Premia", &["BAMLH0A0HYM2EY", "TEDRATE"]);
        add("Sentiment & Spending", &["UMCSENT", "RSAFS"]);
        add("Market Stress", &["VIXCLS"]);
        add("Commodities", &["DCOILWTICO"]);
        add("Equity Market", &["SP500"]);

        Self { categories }
    }
}
