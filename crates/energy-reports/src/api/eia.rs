//! U.S. Energy Information Administration (EIA) API client
//!
//! Weekly petroleum stocks and natural gas storage come from here. Legacy
//! series ids (`PET.WCESTUS1.W`) are served by the v2 `seriesid` route; the
//! parser also understands the v1 `series[0].data` layout.
//!
//! Rate Limit: 5000 requests per hour

use super::{SharedRateLimiter, check_status, http_client};
use crate::config::{EIA_BASE_URL, ReportConfig};
use crate::error::{ReportError, Result};
use crate::retry::RetryPolicy;
use crate::series::{Observation, Series, SeriesSource};
use crate::source::SeriesFetcher;
use async_trait::async_trait;
use chrono::NaiveDate;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde_json::Value;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// Default weekly series for the inventory job
pub mod series {
    /// Weekly U.S. Ending Stocks excluding SPR of Crude Oil
    pub const CRUDE_EX_SPR: &str = "PET.WCESTUS1.W";
    /// Weekly U.S. Ending Stocks of Crude Oil and Petroleum Products
    pub const CRUDE_AND_PRODUCTS: &str = "PET.WTTSTUS1.W";
    /// Weekly Lower 48 States Natural Gas Working Underground Storage
    pub const GAS_STORAGE_L48: &str = "NG.NW2_EPG0_SWO_R48_BCF.W";
}

/// EIA API client
#[derive(Debug, Clone)]
pub struct EiaClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    retry: RetryPolicy,
}

impl EiaClient {
    /// Create a new EIA client with the default hourly quota
    pub fn new(api_key: impl Into<String>) -> Self {
        let burst = NonZeroU32::new(5000).unwrap_or(NonZeroU32::MIN);
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: EIA_BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_hour(burst))),
            retry: RetryPolicy::default(),
        }
    }

    /// Create from environment variable EIA_API_KEY
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("EIA_API_KEY").map_err(|_| {
            ReportError::ConfigError("EIA_API_KEY environment variable not set".to_string())
        })?;
        Ok(Self::new(api_key))
    }

    /// Client for `config`, or `None` when no EIA key is configured
    pub fn from_config(config: &ReportConfig) -> Result<Option<Self>> {
        let Some(key) = config.eia_api_key.as_deref() else {
            return Ok(None);
        };

        Ok(Some(
            Self::new(key)
                .with_client(http_client(config)?)
                .with_base_url(&config.eia_base_url)
                .with_retry(config.retry.clone()),
        ))
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    #[must_use]
    pub fn with_client(mut self, client: Client) -> Self {
        self.client = client;
        self
    }

    /// Raw JSON document for a legacy series id
    #[instrument(skip(self), fields(provider = "eia"))]
    pub async fn get_series_json(&self, series_id: &str) -> Result<Value> {
        let url = format!("{}/v2/seriesid/{}", self.base_url, series_id);
        let (url, api_key) = (url.as_str(), self.api_key.as_str());

        self.retry
            .execute("eia.seriesid", move || async move {
                self.rate_limiter.until_ready().await;

                let response = self
                    .client
                    .get(url)
                    .query(&[("api_key", api_key)])
                    .send()
                    .await?;
                let response = check_status(response, "EIA").await?;
                Ok(response.json::<Value>().await?)
            })
            .await
    }

    /// Fetch a series; observations before `start` are dropped
    pub async fn fetch_series(&self, series_id: &str, start: Option<NaiveDate>) -> Result<Series> {
        let document = self.get_series_json(series_id).await?;
        let mut series = parse_series(series_id, &document)?;
        if let Some(start) = start {
            series.observations.retain(|o| o.date >= start);
        }
        if series.valued().next().is_none() {
            return Err(ReportError::unavailable(
                series_id,
                format!("Nenhum valor numérico válido encontrado para série {series_id}."),
            ));
        }
        debug!("EIA {} returned {} observations", series_id, series.len());
        Ok(series)
    }
}

/// Parse an EIA period in any of the shapes the API uses
///
/// `YYYYMMDD`, `YYYYMM`, `YYYY-MM-DD` and `YYYY-MM`; monthly periods map to
/// the first day of the month.
pub fn parse_period(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let digits = raw.chars().all(|c| c.is_ascii_digit());
    let num = |s: &str| s.parse::<u32>().ok();

    match raw.len() {
        8 if digits => NaiveDate::from_ymd_opt(
            raw[..4].parse().ok()?,
            num(&raw[4..6])?,
            num(&raw[6..8])?,
        ),
        6 if digits => NaiveDate::from_ymd_opt(raw[..4].parse().ok()?, num(&raw[4..6])?, 1),
        10 => NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok(),
        7 => NaiveDate::parse_from_str(&format!("{raw}-01"), "%Y-%m-%d").ok(),
        _ => None,
    }
}

/// JSON number, numeric string, or nothing
fn parse_value(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) if !s.trim().is_empty() => s.trim().parse().ok(),
        _ => None,
    }
}

fn period_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Parse a v2 `response.data` or v1 `series[0]` document
pub fn parse_series(series_id: &str, document: &Value) -> Result<Series> {
    if let Some(error) = document.get("error") {
        let message = error
            .as_str()
            .map_or_else(|| error.to_string(), str::to_string);
        return Err(ReportError::ApiError(format!("EIA error: {message}")));
    }

    let mut label = None;
    let mut id = series_id.to_string();
    let mut observations = Vec::new();

    if let Some(rows) = document.pointer("/response/data").and_then(Value::as_array) {
        for row in rows {
            if label.is_none() {
                label = row
                    .get("series-description")
                    .and_then(Value::as_str)
                    .map(str::to_string);
            }
            push_row(series_id, row.get("period"), row.get("value"), &mut observations);
        }
    } else if let Some(first) = document
        .get("series")
        .and_then(Value::as_array)
        .and_then(|s| s.first())
    {
        if let Some(sid) = first.get("series_id").and_then(Value::as_str) {
            id = sid.to_string();
        }
        label = first.get("name").and_then(Value::as_str).map(str::to_string);

        for entry in first.get("data").and_then(Value::as_array).into_iter().flatten() {
            let pair = entry.as_array();
            push_row(
                series_id,
                pair.and_then(|p| p.first()),
                pair.and_then(|p| p.get(1)),
                &mut observations,
            );
        }
    }

    if observations.is_empty() {
        return Err(ReportError::unavailable(series_id, "EIA returned empty series"));
    }

    let label = label.unwrap_or_else(|| id.clone());
    Ok(Series::new(id, label, SeriesSource::Eia, observations))
}

fn push_row(
    series_id: &str,
    period: Option<&Value>,
    value: Option<&Value>,
    out: &mut Vec<Observation>,
) {
    let Some(raw) = period.and_then(period_text) else {
        return;
    };
    match parse_period(&raw) {
        Some(date) => out.push(Observation::new(date, value.and_then(parse_value))),
        None => warn!("EIA {}: dropping row with unparseable period '{}'", series_id, raw),
    }
}

#[async_trait]
impl SeriesFetcher for EiaClient {
    fn source(&self) -> SeriesSource {
        SeriesSource::Eia
    }

    async fn fetch(&self, id: &str, start: Option<NaiveDate>) -> Result<Series> {
        self.fetch_series(id, start).await
    }
}
