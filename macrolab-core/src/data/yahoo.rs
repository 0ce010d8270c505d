//! Yahoo Finance market-data provider.
//!
//! Fetches daily OHLCV bars from Yahoo's v8 chart API and adjusts OHLC for
//! dividends and splits using the `adjclose / close` ratio of each bar.
//!
//! Yahoo Finance has no official API and is subject to unannounced format
//! changes; parse failures surface as `ResponseFormatChanged`.

use chrono::{NaiveDate, NaiveTime};
use serde::Deserialize;
use std::time::Duration;
use tracing::info;

use super::provider::{MarketProvider, ProviderError};
use crate::domain::MarketBar;

const BASE_URL: &str = "https://query2.finance.yahoo.com/v8/finance/chart";

/// Yahoo Finance v8 chart API response.
#[derive(Debug, Deserialize)]
struct ChartResponse {
    chart: ChartResult,
}

#[derive(Debug, Deserialize)]
struct ChartResult {
    result: Option<Vec<ChartData>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct ChartData {
    timestamp: Option<Vec<i64>>,
    indicators: Indicators,
}

#[derive(Debug, Deserialize)]
struct Indicators {
    quote: Vec<QuoteData>,
    adjclose: Option<Vec<AdjCloseData>>,
}

#[derive(Debug, Deserialize)]
struct QuoteData {
    open: Vec<Option<f64>>,
    high: Vec<Option<f64>>,
    low: Vec<Option<f64>>,
    close: Vec<Option<f64>>,
    volume: Vec<Option<u64>>,
}

#[derive(Debug, Deserialize)]
struct AdjCloseData {
    adjclose: Vec<Option<f64>>,
}

/// Yahoo Finance market provider.
pub struct YahooProvider {
    client: reqwest::blocking::Client,
    base_url: String,
}

impl YahooProvider {
    pub fn new() -> Result<Self, ProviderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(30))
            .user_agent("Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36")
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            base_url: BASE_URL.to_string(),
        })
    }

    /// Build the chart API URL for a ticker and date range (end exclusive).
    fn chart_url(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> String {
        let start_ts = start.and_time(NaiveTime::MIN).and_utc().timestamp();
        let end_ts = end.and_time(NaiveTime::MIN).and_utc().timestamp();
        format!(
            "{}/{ticker}?period1={start_ts}&period2={end_ts}&interval=1d&includeAdjustedClose=true&events=div%2Csplit",
            self.base_url
        )
    }
}

impl MarketProvider for YahooProvider {
    fn name(&self) -> &str {
        "yahoo_finance"
    }

    fn fetch(&self, ticker: &str, start: NaiveDate, end: NaiveDate) -> Result<Vec<MarketBar>, ProviderError> {
        let url = self.chart_url(ticker, start, end);
        let resp = self
            .client
            .get(&url)
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .unwrap_or(60);
            return Err(ProviderError::RateLimited {
                retry_after_secs: retry_after,
            });
        }
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(ProviderError::AuthenticationFailed(format!(
                "Yahoo Finance refused the request (HTTP {status})"
            )));
        }
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ProviderError::UnknownIdentifier { id: ticker.to_string() });
        }
        if !status.is_success() {
            return Err(ProviderError::HttpStatus {
                status: status.as_u16(),
                id: ticker.to_string(),
                message: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        let chart: ChartResponse = resp.json().map_err(|e| {
            ProviderError::ResponseFormatChanged(format!("failed to parse response for {ticker}: {e}"))
        })?;

        let bars = parse_response(ticker, chart)?;
        info!(ticker, bars = bars.len(), "Yahoo fetch complete");
        Ok(bars)
    }
}

/// Parse the chart API response into adjusted bars.
fn parse_response(ticker: &str, resp: ChartResponse) -> Result<Vec<MarketBar>, ProviderError> {
    let result = resp.chart.result.ok_or_else(|| {
        if let Some(err) = resp.chart.error {
            if err.code == "Not Found" {
                ProviderError::UnknownIdentifier { id: ticker.to_string() }
            } else {
                ProviderError::ResponseFormatChanged(format!("{}: {}", err.code, err.description))
            }
        } else {
            ProviderError::ResponseFormatChanged("empty result with no error".into())
        }
    })?;

    let data = result
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ResponseFormatChanged("result array is empty".into()))?;

    // A valid ticker with no trading days in range has no timestamps.
    let timestamps = data.timestamp.unwrap_or_default();

    let quote = data
        .indicators
        .quote
        .into_iter()
        .next()
        .ok_or_else(|| ProviderError::ResponseFormatChanged("no quote data".into()))?;

    let adj_closes = data
        .indicators
        .adjclose
        .and_then(|v| v.into_iter().next())
        .map(|a| a.adjclose);

    let mut bars = Vec::with_capacity(timestamps.len());

    for (i, &ts) in timestamps.iter().enumerate() {
        let date = chrono::DateTime::from_timestamp(ts, 0)
            .map(|dt| dt.naive_utc().date())
            .ok_or_else(|| ProviderError::ResponseFormatChanged(format!("invalid timestamp: {ts}")))?;

        let open = quote.open.get(i).copied().flatten();
        let high = quote.high.get(i).copied().flatten();
        let low = quote.low.get(i).copied().flatten();
        let close = quote.close.get(i).copied().flatten();
        let volume = quote.volume.get(i).copied().flatten();

        // Skip bars where all OHLCV are None (holidays/non-trading days)
        if open.is_none() && high.is_none() && low.is_none() && close.is_none() && volume.is_none() {
            continue;
        }

        let adj_close = adj_closes.as_ref().and_then(|v| v.get(i).copied().flatten());
        let ratio = adjustment_ratio(close, adj_close);

        bars.push(MarketBar {
            date,
            open: open.map_or(f64::NAN, |v| v * ratio),
            high: high.map_or(f64::NAN, |v| v * ratio),
            low: low.map_or(f64::NAN, |v| v * ratio),
            close: close.map_or(f64::NAN, |v| v * ratio),
            volume: volume.unwrap_or(0),
        });
    }

    Ok(bars)
}

/// `adj_close / close`, or 1.0 when either side is missing or degenerate.
fn adjustment_ratio(close: Option<f64>, adj_close: Option<f64>) -> f64 {
    match (close, adj_close) {
        (Some(c), Some(a)) if c != 0.0 && c.is_finite() && a.is_finite() => a / c,
        _ => 1.0,
    }
}
