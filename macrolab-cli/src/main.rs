//! MacroLab CLI — run the FRED and Yahoo Finance data pipelines.
//!
//! `macrolab --pipeline both` runs the economic pipeline (extract FRED series,
//! transform, persist) and then the market pipeline (extract daily bars for a
//! ticker, persist). Exit code is 0 only if every requested pipeline succeeds.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, ValueEnum};
use macrolab_runner::{
    run_requested, EconomicRunOptions, LiveProviders, MarketRunOptions, PipelineConfig, PipelineError,
    PipelineSelection, StdoutProgress,
};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum PipelineArg {
    /// FRED economic series: extract, transform, persist.
    #[value(alias = "fred")]
    Economic,
    /// Yahoo Finance daily bars: extract, persist.
    #[value(alias = "yahoo")]
    Market,
    Both,
}

impl From<PipelineArg> for PipelineSelection {
    fn from(arg: PipelineArg) -> Self {
        match arg {
            PipelineArg::Economic => PipelineSelection::Economic,
            PipelineArg::Market => PipelineSelection::Market,
            PipelineArg::Both => PipelineSelection::Both,
        }
    }
}

#[derive(Parser)]
#[command(name = "macrolab", about = "MacroLab — data pipeline for FRED and Yahoo Finance")]
struct Cli {
    /// Which pipeline to run.
    #[arg(long, value_enum, default_value = "both")]
    pipeline: PipelineArg,

    /// Months of history in the processed table.
    #[arg(long, default_value_t = 12)]
    lookback: u32,

    /// Credentials file (JSON with `fred_api_key`).
    #[arg(long, default_value = "config.json")]
    config: PathBuf,

    /// Series universe and normalization rules (TOML). Defaults to the built-in dashboard set.
    #[arg(long)]
    series_config: Option<PathBuf>,

    /// Directory of the FRED raw table.
    #[arg(long, default_value = "data/raw/fred")]
    fred_raw_path: PathBuf,

    /// Directory of the processed table.
    #[arg(long, default_value = "data/processed/fred")]
    processed_path: PathBuf,

    /// Also write the processed records to this CSV file.
    #[arg(long)]
    export_csv: Option<PathBuf>,

    /// Yahoo Finance ticker symbol.
    #[arg(long, default_value = "^GSPC")]
    ticker: String,

    /// Start date for Yahoo data (YYYY-MM-DD).
    #[arg(long, default_value = "1969-01-01")]
    start_date: String,

    /// End date for Yahoo data (YYYY-MM-DD, exclusive). Defaults to today.
    #[arg(long)]
    end_date: Option<String>,

    /// Directory of the Yahoo raw table.
    #[arg(long, default_value = "data/raw/yahoo")]
    yahoo_raw_path: PathBuf,

    /// Name of the market table.
    #[arg(long, default_value = "sp500")]
    market_table: String,

    /// Skip extraction and reuse the stored raw tables.
    #[arg(long, default_value_t = false)]
    skip_extract: bool,
}

fn main() -> ExitCode {
    init_tracing();

    match run(Cli::parse()) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("macrolab=info")))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}

fn run(cli: Cli) -> Result<bool> {
    let today = chrono::Local::now().date_naive();

    // Each pipeline's options are checked on their own so a bad flag for one
    // pipeline does not stop the other.
    let economic = economic_options(&cli, today).map_err(invalid_options);
    let market = market_options(&cli, today).map_err(invalid_options);
    let providers = LiveProviders::new(cli.config);

    Ok(run_requested(cli.pipeline.into(), economic, market, &providers, &StdoutProgress))
}

fn invalid_options(e: anyhow::Error) -> PipelineError {
    PipelineError::InvalidOptions(format!("{e:#}"))
}

fn economic_options(cli: &Cli, today: NaiveDate) -> Result<EconomicRunOptions> {
    let config = match &cli.series_config {
        Some(path) => PipelineConfig::from_file(path)
            .with_context(|| format!("failed to load series config {}", path.display()))?,
        None => PipelineConfig::default(),
    };

    Ok(EconomicRunOptions {
        lookback_months: cli.lookback,
        as_of: today,
        raw_dir: cli.fred_raw_path.clone(),
        processed_dir: cli.processed_path.clone(),
        skip_extract: cli.skip_extract,
        config,
        export_csv: cli.export_csv.clone(),
    })
}

fn market_options(cli: &Cli, today: NaiveDate) -> Result<MarketRunOptions> {
    Ok(MarketRunOptions {
        ticker: cli.ticker.clone(),
        start: parse_date(&cli.start_date).context("invalid --start-date")?,
        end: cli
            .end_date
            .as_deref()
            .map(parse_date)
            .transpose()
            .context("invalid --end-date")?
            .unwrap_or(today),
        raw_dir: cli.yahoo_raw_path.clone(),
        table: cli.market_table.clone(),
        skip_extract: cli.skip_extract,
    })
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").with_context(|| format!("expected YYYY-MM-DD, got '{s}'"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_dashboard_setup() {
        let cli = Cli::try_parse_from(["macrolab"]).unwrap();
        assert!(matches!(cli.pipeline, PipelineArg::Both));
        assert_eq!(cli.lookback, 12);
        assert_eq!(cli.ticker, "^GSPC");
        assert_eq!(cli.start_date, "1969-01-01");
        assert_eq!(cli.market_table, "sp500");
        assert!(!cli.skip_extract);
    }

    #[test]
    fn pipeline_aliases() {
        let cli = Cli::try_parse_from(["macrolab", "--pipeline", "fred"]).unwrap();
        assert_eq!(PipelineSelection::from(cli.pipeline), PipelineSelection::Economic);
        let cli = Cli::try_parse_from(["macrolab", "--pipeline", "yahoo"]).unwrap();
        assert_eq!(PipelineSelection::from(cli.pipeline), PipelineSelection::Market);
    }

    #[test]
    fn rejects_unknown_pipeline() {
        assert!(Cli::try_parse_from(["macrolab", "--pipeline", "bloomberg"]).is_err());
    }

    #[test]
    fn parse_date_rejects_garbage() {
        assert!(parse_date("2024-13-01").is_err());
        assert_eq!(parse_date("2024-01-31").unwrap(), NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    #[test]
    fn bad_start_date_only_rejects_market_options() {
        let cli = Cli::try_parse_from(["macrolab", "--pipeline", "fred", "--start-date", "not-a-date"]).unwrap();
        assert!(economic_options(&cli, today()).is_ok());

        let err = market_options(&cli, today()).map_err(invalid_options).unwrap_err();
        assert!(err.to_string().contains("invalid --start-date"));
    }

    #[test]
    fn missing_series_config_only_rejects_economic_options() {
        let cli = Cli::try_parse_from([
            "macrolab",
            "--pipeline",
            "yahoo",
            "--series-config",
            "/nonexistent/macrolab/series.toml",
        ])
        .unwrap();

        let err = economic_options(&cli, today()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to load series config"));

        let market = market_options(&cli, today()).unwrap();
        assert_eq!(market.end, today());
        assert_eq!(market.start, NaiveDate::from_ymd_opt(1969, 1, 1).unwrap());
    }
}
