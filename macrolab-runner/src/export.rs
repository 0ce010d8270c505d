//! CSV export of the processed record set.
//!
//! Columns: date, series_id, value. Missing values are written as empty
//! fields.

use std::path::Path;

use anyhow::{Context, Result};
use macrolab_core::domain::Observation;

/// Render observations as CSV.
pub fn export_observations_csv(records: &[Observation]) -> Result<String> {
    let mut wtr = csv::Writer::from_writer(vec![]);

    wtr.write_record(["date", "series_id", "value"])?;

    for r in records {
        let value = r.value.map(|v| v.to_string()).unwrap_or_default();
        wtr.write_record([r.date.to_string().as_str(), r.series_id.as_str(), value.as_str()])?;
    }

    let bytes = wtr.into_inner().context("failed to flush CSV writer")?;
    String::from_utf8(bytes).context("CSV output is not valid UTF-8")
}

/// Write observations as CSV to `path`, creating parent directories.
pub fn write_observations_csv(path: &Path, records: &[Observation]) -> Result<()> {
    let csv = export_observations_csv(records)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, csv).with_context(|| format!("failed to write {}", path.display()))
}
