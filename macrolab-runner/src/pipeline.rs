//! Economic and market pipeline runs.
//!
//! Economic: extract FRED series (window plus a year of history) -> persist
//! raw -> transform -> persist processed (and optionally export CSV).
//! Market: extract daily bars for one ticker -> persist.
//!
//! Runs are serial and all-or-nothing: a failed step ends the run, and the
//! processed table is only replaced after a successful transform.

use std::path::PathBuf;

use chrono::NaiveDate;
use macrolab_core::data::{ProviderError, StoreError, TableStore, PROCESSED_TABLE, RAW_TABLE};
use macrolab_core::transform::{SeriesSummary, TransformError, TransformOutput, Window, YOY_LAG};
use thiserror::Error;
use tracing::{debug, error, info};

use crate::config::{ConfigError, PipelineConfig};
use crate::credentials::CredentialsError;
use crate::export::write_observations_csv;
use crate::progress::{error_chain, PipelineProgress, Step};
use crate::providers::ProviderSource;

pub const ECONOMIC_TITLE: &str = "FRED Data Pipeline";
pub const MARKET_TITLE: &str = "Yahoo Finance Pipeline";

/// Errors from a pipeline run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Provider(#[from] ProviderError),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Credentials(#[from] CredentialsError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("invalid date range: start {start} is not before end {end}")]
    InvalidDateRange { start: NaiveDate, end: NaiveDate },

    #[error("CSV export failed: {0}")]
    Export(String),

    #[error("invalid options: {0}")]
    InvalidOptions(String),
}

/// Which pipelines to run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PipelineSelection {
    Economic,
    Market,
    #[default]
    Both,
}

impl PipelineSelection {
    pub fn includes_economic(self) -> bool {
        matches!(self, Self::Economic | Self::Both)
    }

    pub fn includes_market(self) -> bool {
        matches!(self, Self::Market | Self::Both)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineKind {
    Economic,
    Market,
}

impl PipelineKind {
    pub fn title(self) -> &'static str {
        match self {
            Self::Economic => ECONOMIC_TITLE,
            Self::Market => MARKET_TITLE,
        }
    }
}

/// Options for the economic (FRED) pipeline.
#[derive(Debug, Clone)]
pub struct EconomicRunOptions {
    pub lookback_months: u32,
    /// Last day of the output window (normally today).
    pub as_of: NaiveDate,
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub skip_extract: bool,
    pub config: PipelineConfig,
    pub export_csv: Option<PathBuf>,
}

/// Options for the market (Yahoo Finance) pipeline.
#[derive(Debug, Clone)]
pub struct MarketRunOptions {
    pub ticker: String,
    pub start: NaiveDate,
    /// Exclusive.
    pub end: NaiveDate,
    pub raw_dir: PathBuf,
    pub table: String,
    pub skip_extract: bool,
}

/// Outcome of a successful run.
#[derive(Debug, Clone)]
pub struct PipelineReport {
    pub kind: PipelineKind,
    /// Records fetched and persisted; `None` when extraction was skipped.
    pub extracted: Option<usize>,
    /// Records in the processed table; `None` for market runs.
    pub processed: Option<usize>,
    /// Output window; economic runs only.
    pub window: Option<Window>,
    pub summaries: Vec<SeriesSummary>,
}

/// Run `step`, reporting completion or failure to `progress`.
fn run_step<T>(
    progress: &dyn PipelineProgress,
    step: Step,
    count: impl Fn(&T) -> usize,
    f: impl FnOnce() -> Result<T, PipelineError>,
) -> Result<T, PipelineError> {
    progress.on_step_start(step);
    match f() {
        Ok(value) => {
            progress.on_step_complete(step, count(&value));
            Ok(value)
        }
        Err(e) => {
            progress.on_step_failed(step, &e);
            Err(e)
        }
    }
}

/// Extract, transform and persist the configured FRED series.
pub fn run_economic_pipeline(
    opts: &EconomicRunOptions,
    providers: &dyn ProviderSource,
    progress: &dyn PipelineProgress,
) -> Result<PipelineReport, PipelineError> {
    let window = Window::lookback(opts.as_of, opts.lookback_months);
    let details: Vec<String> = window
        .iter()
        .map(|w| format!("Period: {} to {}", w.start.format("%Y-%m"), w.end.format("%Y-%m")))
        .collect();
    progress.on_pipeline_start(ECONOMIC_TITLE, &details);

    let checked = opts
        .config
        .validate()
        .map_err(PipelineError::from)
        .and_then(|()| window.map_err(PipelineError::from));
    let window = match checked {
        Ok(window) => window,
        Err(e) => {
            progress.on_pipeline_failed(ECONOMIC_TITLE, &e);
            return Err(e);
        }
    };

    let raw_store = TableStore::new(&opts.raw_dir);
    let processed_store = TableStore::new(&opts.processed_dir);
    raw_store.ensure_dir()?;
    processed_store.ensure_dir()?;

    let extracted = if opts.skip_extract {
        progress.on_step_skipped(Step::Extract);
        None
    } else {
        let raw = run_step(progress, Step::Extract, Vec::len, || {
            let provider = providers.economic()?;
            // One extra year so the first YoY point inside the window has a base.
            let fetch_window = window.extend_back(YOY_LAG as u32)?;
            let series = opts.config.universe.all_series();
            info!(
                provider = provider.name(),
                series = series.len(),
                start = %fetch_window.start,
                end = %fetch_window.end,
                "fetching economic series"
            );
            let raw = provider.fetch(&series, fetch_window.start, fetch_window.end)?;
            raw_store.write_observations(RAW_TABLE, &raw)?;
            Ok(raw)
        })?;
        Some(raw)
    };
    let extracted_count = extracted.as_ref().map(Vec::len);

    let output = run_step(progress, Step::Transform, |out: &TransformOutput| out.records.len(), || {
        let raw = match extracted {
            Some(raw) => raw,
            None => raw_store.read_observations(RAW_TABLE)?,
        };
        let output = opts.config.transformer().run(&raw, window)?;
        // Export first: a failed export must leave the processed table untouched.
        if let Some(path) = &opts.export_csv {
            write_observations_csv(path, &output.records).map_err(|e| PipelineError::Export(format!("{e:#}")))?;
            info!(path = %path.display(), "exported processed records");
        }
        processed_store.write_observations(PROCESSED_TABLE, &output.records)?;
        Ok(output)
    })?;

    for s in &output.summaries {
        debug!(
            series_id = %s.series_id,
            rule = s.rule.label(),
            raw = s.raw_points,
            normalized = s.normalized_points,
            output = s.output_points,
            "series summary"
        );
    }

    progress.on_pipeline_complete(ECONOMIC_TITLE);

    Ok(PipelineReport {
        kind: PipelineKind::Economic,
        extracted: extracted_count,
        processed: Some(output.records.len()),
        window: Some(output.window),
        summaries: output.summaries,
    })
}

/// Extract and persist daily bars for one ticker.
pub fn run_market_pipeline(
    opts: &MarketRunOptions,
    providers: &dyn ProviderSource,
    progress: &dyn PipelineProgress,
) -> Result<PipelineReport, PipelineError> {
    progress.on_pipeline_start(
        MARKET_TITLE,
        &[
            format!("Ticker: {}", opts.ticker),
            format!("Period: {} to {}", opts.start, opts.end),
        ],
    );

    if opts.start >= opts.end {
        let e = PipelineError::InvalidDateRange {
            start: opts.start,
            end: opts.end,
        };
        progress.on_pipeline_failed(MARKET_TITLE, &e);
        return Err(e);
    }

    let store = TableStore::new(&opts.raw_dir);
    store.ensure_dir()?;

    let extracted = if opts.skip_extract {
        progress.on_step_skipped(Step::Extract);
        None
    } else {
        let count = run_step(progress, Step::Extract, |n: &usize| *n, || {
            let provider = providers.market()?;
            info!(provider = provider.name(), ticker = %opts.ticker, "fetching market bars");
            let bars = provider.fetch(&opts.ticker, opts.start, opts.end)?;
            store.write_bars(&opts.table, &bars)?;
            Ok(bars.len())
        })?;
        Some(count)
    };

    progress.on_pipeline_complete(MARKET_TITLE);

    Ok(PipelineReport {
        kind: PipelineKind::Market,
        extracted,
        processed: None,
        window: None,
        summaries: Vec::new(),
    })
}

/// Run the selected pipelines in order (economic, then market).
///
/// Options are resolved per pipeline: an `Err` fails only that pipeline, and
/// options for an unselected pipeline are never inspected. A failing
/// pipeline is logged and does not stop the next one. Returns `true` only if
/// every requested pipeline succeeded.
pub fn run_requested(
    selection: PipelineSelection,
    economic: Result<EconomicRunOptions, PipelineError>,
    market: Result<MarketRunOptions, PipelineError>,
    providers: &dyn ProviderSource,
    progress: &dyn PipelineProgress,
) -> bool {
    let mut success = true;

    if selection.includes_economic() {
        let result = economic
            .map_err(|e| rejected(PipelineKind::Economic, e, progress))
            .and_then(|opts| run_economic_pipeline(&opts, providers, progress));
        success &= report(PipelineKind::Economic, result);
    }
    if selection.includes_market() {
        let result = market
            .map_err(|e| rejected(PipelineKind::Market, e, progress))
            .and_then(|opts| run_market_pipeline(&opts, providers, progress));
        success &= report(PipelineKind::Market, result);
    }

    success
}

/// Report a pipeline whose options could not be built.
fn rejected(kind: PipelineKind, error: PipelineError, progress: &dyn PipelineProgress) -> PipelineError {
    progress.on_pipeline_start(kind.title(), &[]);
    progress.on_pipeline_failed(kind.title(), &error);
    error
}

fn report(kind: PipelineKind, result: Result<PipelineReport, PipelineError>) -> bool {
    match result {
        Ok(r) => {
            info!(
                pipeline = kind.title(),
                extracted = ?r.extracted,
                processed = ?r.processed,
                "pipeline succeeded"
            );
            true
        }
        Err(e) => {
            error!(pipeline = kind.title(), error = %error_chain(&e), "pipeline failed");
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selection_membership() {
        assert!(PipelineSelection::Both.includes_economic());
        assert!(PipelineSelection::Both.includes_market());
        assert!(!PipelineSelection::Economic.includes_market());
        assert!(!PipelineSelection::Market.includes_economic());
        assert_eq!(PipelineSelection::default(), PipelineSelection::Both);
    }

    #[test]
    fn errors_display_their_source() {
        let e: PipelineError = TransformError::EmptyInput.into();
        assert_eq!(e.to_string(), "raw record set is empty");
    }
}
