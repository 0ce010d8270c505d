//! Data provider traits and structured error types.
//!
//! The provider traits abstract over the economic-data source (FRED) and the
//! market-data source (Yahoo Finance) so the pipelines can be exercised with
//! in-memory fakes. Providers don't know about the table store.

use chrono::NaiveDate;
use thiserror::Error;

use crate::domain::{MarketBar, Observation, SeriesId};

/// Structured error types for provider calls.
///
/// Displayable as-is in CLI progress output.
#[derive(Debug, Error)]
pub enum ProviderError {
    #[error("network unreachable: {0}")]
    NetworkUnreachable(String),

    #[error("rate limited by provider (retry after {retry_after_secs}s)")]
    RateLimited { retry_after_secs: u64 },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("unknown identifier: {id}")]
    UnknownIdentifier { id: String },

    #[error("HTTP {status} for {id}: {message}")]
    HttpStatus { status: u16, id: String, message: String },

    #[error("response format changed: {0}")]
    ResponseFormatChanged(String),

    #[error("provider error: {0}")]
    Other(String),
}

/// Source of named economic series.
pub trait EconomicProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch every requested series over `[start, end]`, each observation
    /// tagged with its series id, concatenated in request order.
    fn fetch(
        &self,
        series_ids: &[SeriesId],
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<Observation>, ProviderError>;
}

/// Source of daily OHLCV history for a single ticker.
pub trait MarketProvider: Send + Sync {
    /// Human-readable name of this provider.
    fn name(&self) -> &str;

    /// Fetch daily bars for `ticker` from `start` (inclusive) to `end` (exclusive).
    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<MarketBar>, ProviderError>;
}
