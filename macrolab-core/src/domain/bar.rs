//! MarketBar — one day of a ticker's price history.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Daily OHLCV bar as persisted by the market pipeline.
///
/// OHLC are dividend/split adjusted at fetch time; the provider's dividend
/// and split columns are not carried.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MarketBar {
    pub date: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}
