//! Pipeline configuration: which series to fetch and how to normalize them.
//!
//! Stored as TOML:
//!
//! ```toml
//! duplicate_policy = "keep_last"
//!
//! [universe.categories]
//! "Labor Market" = ["UNRATE", "ICSA"]
//! "Inflation & Prices" = ["CPIAUCSL"]
//!
//! [rules]
//! ICSA = { type = "resample_sum", frequency = "monthly" }
//! CPIAUCSL = { type = "yoy_percent_change" }
//! ```
//!
//! Every field is optional; omitted fields take the dashboard defaults.

use macrolab_core::data::SeriesUniverse;
use macrolab_core::domain::{DuplicatePolicy, SeriesId};
use macrolab_core::transform::{RuleTable, SeriesTransformer};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read pipeline config {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid pipeline config")]
    Parse(#[from] toml::de::Error),

    #[error("pipeline config serialization failed")]
    Serialize(#[from] toml::ser::Error),

    #[error("series universe is empty")]
    EmptyUniverse,

    #[error("rule for '{series_id}' names a series outside the universe")]
    UnknownRuleSeries { series_id: SeriesId },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub duplicate_policy: DuplicatePolicy,
    pub universe: SeriesUniverse,
    pub rules: RuleTable,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            universe: SeriesUniverse::default_fred(),
            rules: RuleTable::default_fred(),
        }
    }
}

impl PipelineConfig {
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: PipelineConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// A rule for a series that is never fetched would fail every run, so it
    /// is rejected up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.universe.series_count() == 0 {
            return Err(ConfigError::EmptyUniverse);
        }
        if let Some(id) = self.rules.series_ids().find(|id| !self.universe.contains(id)) {
            return Err(ConfigError::UnknownRuleSeries { series_id: id.clone() });
        }
        Ok(())
    }

    pub fn transformer(&self) -> SeriesTransformer {
        SeriesTransformer::new(self.rules.clone()).with_duplicate_policy(self.duplicate_policy)
    }
}
