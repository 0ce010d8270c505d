//! MacroLab Runner — pipeline orchestration.
//!
//! This crate builds on `macrolab-core` to provide:
//! - Economic (FRED) pipeline: extract -> persist raw -> transform -> persist processed
//! - Market (Yahoo Finance) pipeline: extract -> persist
//! - TOML pipeline config (series universe, rules, duplicate policy)
//! - Credentials loading and live provider construction
//! - Stdout progress reporting and CSV export

pub mod config;
pub mod credentials;
pub mod export;
pub mod pipeline;
pub mod progress;
pub mod providers;

pub use config::{ConfigError, PipelineConfig};
pub use credentials::{Credentials, CredentialsError};
pub use export::{export_observations_csv, write_observations_csv};
pub use pipeline::{
    run_economic_pipeline, run_market_pipeline, run_requested, EconomicRunOptions, MarketRunOptions,
    PipelineError, PipelineKind, PipelineReport, PipelineSelection,
};
pub use progress::{error_chain, PipelineProgress, Step, StdoutProgress};
pub use providers::{LiveProviders, ProviderSource};
