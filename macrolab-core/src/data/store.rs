//! Parquet table store.
//!
//! Layout: `{dir}/{table}.parquet` plus a `{dir}/{table}.meta.json` sidecar.
//!
//! Every write replaces the whole table. Writes are atomic (write to `.tmp`,
//! rename into place), so a failed run leaves the previous table untouched.
//! Loads validate the column schema.

use chrono::{Duration, NaiveDate};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use super::schema::{MarketBarSchema, ObservationSchema, SchemaError};
use crate::domain::{MarketBar, Observation, SeriesId};

pub const RAW_TABLE: &str = "raw_data";
pub const PROCESSED_TABLE: &str = "processed_data";

/// Errors from the table store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("I/O error at {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("parquet I/O error: {0}")]
    Parquet(String),

    #[error("schema error in table '{table}'")]
    Schema {
        table: String,
        #[source]
        source: SchemaError,
    },

    #[error("no table '{table}' in {dir}")]
    MissingTable { table: String, dir: PathBuf },

    #[error("metadata error: {0}")]
    Metadata(String),
}

/// Metadata sidecar for a stored table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableMeta {
    pub table: String,
    pub row_count: usize,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub data_hash: String,
    pub written_at: chrono::NaiveDateTime,
}

/// A directory of Parquet tables.
#[derive(Debug, Clone)]
pub struct TableStore {
    dir: PathBuf,
}

impl TableStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Create the store directory (and parents) if missing.
    pub fn ensure_dir(&self) -> Result<(), StoreError> {
        fs::create_dir_all(&self.dir).map_err(|source| StoreError::Io {
            path: self.dir.clone(),
            source,
        })
    }

    pub fn table_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.parquet"))
    }

    fn meta_path(&self, table: &str) -> PathBuf {
        self.dir.join(format!("{table}.meta.json"))
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.table_path(table).exists()
    }

    /// Replace `table` with `records`.
    pub fn write_observations(&self, table: &str, records: &[Observation]) -> Result<TableMeta, StoreError> {
        let df = observations_to_dataframe(records)?;
        let hash = content_hash(records)?;
        let dates = records.iter().map(|r| r.date);
        self.replace_table(table, df, hash, dates)
    }

    /// Load every row of an observation table, in stored order.
    pub fn read_observations(&self, table: &str) -> Result<Vec<Observation>, StoreError> {
        let df = self.read_table(table)?;
        ObservationSchema::validate(&df).map_err(|source| StoreError::Schema {
            table: table.to_string(),
            source,
        })?;
        dataframe_to_observations(&df)
    }

    /// Replace `table` with `bars`.
    pub fn write_bars(&self, table: &str, bars: &[MarketBar]) -> Result<TableMeta, StoreError> {
        let df = bars_to_dataframe(bars)?;
        let hash = content_hash(bars)?;
        let dates = bars.iter().map(|b| b.date);
        self.replace_table(table, df, hash, dates)
    }

    /// Load every row of a market table, in stored order.
    pub fn read_bars(&self, table: &str) -> Result<Vec<MarketBar>, StoreError> {
        let df = self.read_table(table)?;
        MarketBarSchema::validate(&df).map_err(|source| StoreError::Schema {
            table: table.to_string(),
            source,
        })?;
        dataframe_to_bars(&df)
    }

    /// Metadata sidecar of `table`, if present and readable.
    pub fn meta(&self, table: &str) -> Option<TableMeta> {
        let content = fs::read_to_string(self.meta_path(table)).ok()?;
        serde_json::from_str(&content).ok()
    }

    fn replace_table(
        &self,
        table: &str,
        mut df: DataFrame,
        data_hash: String,
        dates: impl Iterator<Item = NaiveDate>,
    ) -> Result<TableMeta, StoreError> {
        self.ensure_dir()?;

        let path = self.table_path(table);
        let tmp_path = path.with_extension("parquet.tmp");
        write_parquet(&mut df, &tmp_path)?;

        // Atomic rename
        fs::rename(&tmp_path, &path).map_err(|source| {
            // Clean up temp file on rename failure
            let _ = fs::remove_file(&tmp_path);
            StoreError::Io {
                path: path.clone(),
                source,
            }
        })?;

        let (start_date, end_date) = dates.fold((None, None), |(lo, hi): (Option<NaiveDate>, Option<NaiveDate>), d| {
            (Some(lo.map_or(d, |l| l.min(d))), Some(hi.map_or(d, |h| h.max(d))))
        });

        let meta = TableMeta {
            table: table.to_string(),
            row_count: df.height(),
            start_date,
            end_date,
            data_hash,
            written_at: chrono::Local::now().naive_local(),
        };
        let meta_json =
            serde_json::to_string_pretty(&meta).map_err(|e| StoreError::Metadata(format!("meta serialization: {e}")))?;
        let meta_path = self.meta_path(table);
        fs::write(&meta_path, meta_json).map_err(|source| StoreError::Io { path: meta_path, source })?;

        debug!(table, rows = meta.row_count, path = %path.display(), "table replaced");
        Ok(meta)
    }

    fn read_table(&self, table: &str) -> Result<DataFrame, StoreError> {
        let path = self.table_path(table);
        if !path.exists() {
            return Err(StoreError::MissingTable {
                table: table.to_string(),
                dir: self.dir.clone(),
            });
        }
        let file = fs::File::open(&path).map_err(|source| StoreError::Io { path: path.clone(), source })?;
        ParquetReader::new(file)
            .finish()
            .map_err(|e| StoreError::Parquet(format!("read {}: {e}", path.display())))
    }
}

/// BLAKE3 over the JSON encoding of the rows.
fn content_hash<T: Serialize>(rows: &[T]) -> Result<String, StoreError> {
    let bytes = serde_json::to_vec(rows).map_err(|e| StoreError::Metadata(format!("hash serialization: {e}")))?;
    Ok(blake3::hash(&bytes).to_hex().to_string())
}

// ── Parquet I/O helpers ─────────────────────────────────────────────

fn epoch() -> NaiveDate {
    NaiveDate::default()
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    (date - epoch()).num_days() as i32
}

fn date_column(dates: Vec<i32>) -> Result<Column, StoreError> {
    Column::new("date".into(), dates)
        .cast(&DataType::Date)
        .map_err(|e| StoreError::Parquet(format!("date cast: {e}")))
}

fn observations_to_dataframe(records: &[Observation]) -> Result<DataFrame, StoreError> {
    let dates: Vec<i32> = records.iter().map(|r| days_since_epoch(r.date)).collect();
    let ids: Vec<&str> = records.iter().map(|r| r.series_id.as_str()).collect();
    let values: Vec<Option<f64>> = records.iter().map(|r| r.value).collect();

    DataFrame::new(vec![
        date_column(dates)?,
        Column::new("series_id".into(), ids),
        Column::new("value".into(), values),
    ])
    .map_err(|e| StoreError::Parquet(format!("dataframe creation: {e}")))
}

fn bars_to_dataframe(bars: &[MarketBar]) -> Result<DataFrame, StoreError> {
    let dates: Vec<i32> = bars.iter().map(|b| days_since_epoch(b.date)).collect();
    let opens: Vec<f64> = bars.iter().map(|b| b.open).collect();
    let highs: Vec<f64> = bars.iter().map(|b| b.high).collect();
    let lows: Vec<f64> = bars.iter().map(|b| b.low).collect();
    let closes: Vec<f64> = bars.iter().map(|b| b.close).collect();
    let volumes: Vec<u64> = bars.iter().map(|b| b.volume).collect();

    DataFrame::new(vec![
        date_column(dates)?,
        Column::new("open".into(), opens),
        Column::new("high".into(), highs),
        Column::new("low".into(), lows),
        Column::new("close".into(), closes),
        Column::new("volume".into(), volumes),
    ])
    .map_err(|e| StoreError::Parquet(format!("dataframe creation: {e}")))
}

fn write_parquet(df: &mut DataFrame, path: &Path) -> Result<(), StoreError> {
    let file = fs::File::create(path).map_err(|source| StoreError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    ParquetWriter::new(file)
        .finish(df)
        .map_err(|e| StoreError::Parquet(format!("write parquet: {e}")))?;
    Ok(())
}

fn dataframe_to_observations(df: &DataFrame) -> Result<Vec<Observation>, StoreError> {
    let map_err = |e: PolarsError| StoreError::Parquet(format!("column read: {e}"));

    let date_ca = df.column("date").map_err(map_err)?.date().map_err(map_err)?;
    let id_ca = df.column("series_id").map_err(map_err)?.str().map_err(map_err)?;
    let value_ca = df.column("value").map_err(map_err)?.f64().map_err(map_err)?;

    let epoch = epoch();
    (0..df.height())
        .map(|i| {
            let days = date_ca
                .get(i)
                .ok_or_else(|| StoreError::Parquet(format!("null date at row {i}")))?;
            let series_id = id_ca
                .get(i)
                .ok_or_else(|| StoreError::Parquet(format!("null series_id at row {i}")))?;
            Ok(Observation {
                date: epoch + Duration::days(days as i64),
                series_id: SeriesId::from(series_id),
                value: value_ca.get(i),
            })
        })
        .collect()
}

fn dataframe_to_bars(df: &DataFrame) -> Result<Vec<MarketBar>, StoreError> {
    let map_err = |e: PolarsError| StoreError::Parquet(format!("column read: {e}"));

    let date_ca = df.column("date").map_err(map_err)?.date().map_err(map_err)?;
    let open_ca = df.column("open").map_err(map_err)?.f64().map_err(map_err)?;
    let high_ca = df.column("high").map_err(map_err)?.f64().map_err(map_err)?;
    let low_ca = df.column("low").map_err(map_err)?.f64().map_err(map_err)?;
    let close_ca = df.column("close").map_err(map_err)?.f64().map_err(map_err)?;
    let vol_ca = df.column("volume").map_err(map_err)?.u64().map_err(map_err)?;

    let epoch = epoch();
    (0..df.height())
        .map(|i| {
            let days = date_ca
                .get(i)
                .ok_or_else(|| StoreError::Parquet(format!("null date at row {i}")))?;
            Ok(MarketBar {
                date: epoch + Duration::days(days as i64),
                open: open_ca.get(i).unwrap_or(f64::NAN),
                high: high_ca.get(i).unwrap_or(f64::NAN),
                low: low_ca.get(i).unwrap_or(f64::NAN),
                close: close_ca.get(i).unwrap_or(f64::NAN),
                volume: vol_ca.get(i).unwrap_or(0),
            })
        })
        .collect()
}
