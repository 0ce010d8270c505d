//! FRED (Federal Reserve Economic Data) provider.
//!
//! One blocking request per series against the `series/observations`
//! endpoint. No retries: the first failure aborts the whole fetch.

use chrono::NaiveDate;
use reqwest::blocking::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info};

use super::provider::{EconomicProvider, ProviderError};
use crate::domain::{Observation, SeriesId};

const BASE_URL: &str = "https://api.stlouisfed.org/fred/series/observations";

/// FRED's maximum page size.
const OBS_LIMIT: usize = 100_000;

pub struct FredProvider {
    client: Client,
    api_key: String,
    base_url: String,
}

impl FredProvider {
    pub fn new(api_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(60))
            .build()
            .map_err(|e| ProviderError::Other(format!("failed to build HTTP client: {e}")))?;
        Ok(Self {
            client,
            api_key: api_key.into(),
            base_url: BASE_URL.to_string(),
        })
    }

    /// Point the client at a different observations endpoint.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn fetch_series(&self, series_id: &SeriesId, start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, ProviderError> {
        let start = start.to_string();
        let end = end.to_string();
        let limit = OBS_LIMIT.to_string();

        let resp = self
            .client
            .get(&self.base_url)
            .query(&[
                ("series_id", series_id.as_str()),
                ("api_key", self.api_key.as_str()),
                ("file_type", "json"),
                ("observation_start", start.as_str()),
                ("observation_end", end.as_str()),
                ("sort_order", "asc"),
                ("limit", limit.as_str()),
            ])
            .send()
            .map_err(|e| ProviderError::NetworkUnreachable(e.to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok());
            let body = resp.text().unwrap_or_default();
            return Err(classify_error(series_id, status.as_u16(), &body, retry_after));
        }

        let body: ObservationsResponse = resp.json().map_err(|e| {
            ProviderError::ResponseFormatChanged(format!("failed to parse FRED response for {series_id}: {e}"))
        })?;

        parse_observations(series_id, body)
    }
}

impl EconomicProvider for FredProvider {
    fn name(&self) -> &str {
        "fred"
    }

    fn fetch(&self, series_ids: &[SeriesId], start: NaiveDate, end: NaiveDate) -> Result<Vec<Observation>, ProviderError> {
        let mut all = Vec::new();
        for series_id in series_ids {
            let obs = self.fetch_series(series_id, start, end)?;
            debug!(series_id = %series_id, count = obs.len(), "fetched FRED series");
            all.extend(obs);
        }
        info!(series = series_ids.len(), records = all.len(), "FRED fetch complete");
        Ok(all)
    }
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    observations: Vec<FredObservation>,
}

#[derive(Debug, Deserialize)]
struct FredObservation {
    date: String,
    value: String,
}

#[derive(Debug, Deserialize)]
struct FredErrorBody {
    error_message: String,
}

fn parse_observations(series_id: &SeriesId, body: ObservationsResponse) -> Result<Vec<Observation>, ProviderError> {
    body.observations
        .into_iter()
        .map(|obs| {
            let date = NaiveDate::parse_from_str(&obs.date, "%Y-%m-%d").map_err(|e| {
                ProviderError::ResponseFormatChanged(format!("invalid FRED date '{}': {e}", obs.date))
            })?;
            Ok(Observation {
                date,
                series_id: series_id.clone(),
                value: parse_value(&obs.value),
            })
        })
        .collect()
}

/// FRED encodes missing values as `"."`.
fn parse_value(raw: &str) -> Option<f64> {
    let trimmed = raw.trim();
    if trimmed == "." || trimmed.is_empty() {
        return None;
    }
    let v = trimmed.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

fn classify_error(series_id: &SeriesId, status: u16, body: &str, retry_after: Option<u64>) -> ProviderError {
    let message = serde_json::from_str::<FredErrorBody>(body)
        .map(|b| b.error_message)
        .unwrap_or_else(|_| body.trim().to_string());

    if status == 429 {
        return ProviderError::RateLimited {
            retry_after_secs: retry_after.unwrap_or(60),
        };
    }
    if status == 401 || status == 403 || message.contains("api_key") {
        return ProviderError::AuthenticationFailed(message);
    }
    if message.contains("does not exist") {
        return ProviderError::UnknownIdentifier {
            id: series_id.to_string(),
        };
    }
    ProviderError::HttpStatus {
        status,
        id: series_id.to_string(),
        message,
    }
}
