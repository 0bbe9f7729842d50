//! Federal Reserve Economic Data (FRED) API client
//!
//! FRED is a database maintained by the Federal Reserve Bank of St. Louis.
//! The energy jobs use it for daily and monthly spot prices.
//!
//! API Key: Free registration at https://fred.stlouisfed.org/docs/api/api_key.html
//! Rate Limit: 120 requests per minute

use super::{SharedRateLimiter, check_status, http_client};
use crate::config::{FRED_BASE_URL, ReportConfig};
use crate::error::{ReportError, Result};
use crate::retry::RetryPolicy;
use crate::series::{Observation, Series, SeriesSource};
use crate::source::SeriesFetcher;
use async_trait::async_trait;
use chrono::NaiveDate;
use governor::{Quota, RateLimiter};
use reqwest::Client;
use serde::Deserialize;
use std::num::NonZeroU32;
use std::sync::Arc;
use tracing::{debug, instrument, warn};

/// FRED series ids used by the energy jobs
pub mod series {
    /// Crude Oil Prices: West Texas Intermediate (daily)
    pub const OIL_WTI: &str = "DCOILWTICO";
    /// Crude Oil Prices: Brent - Europe (daily)
    pub const OIL_BRENT: &str = "DCOILBRENTEU";
    /// Henry Hub Natural Gas Spot Price (daily)
    pub const HENRY_HUB: &str = "DHHNGSP";
    /// Global price of Coal, Australia (monthly)
    pub const COAL_AUSTRALIA: &str = "PCOALAUUSDM";
    /// Global price of Uranium (monthly)
    pub const URANIUM: &str = "PURANUSDM";
    /// Kerosene-Type Jet Fuel, U.S. Gulf Coast (daily)
    pub const JET_FUEL_GULF: &str = "DJFUELUSGULF";
    /// Conventional Gasoline, Los Angeles (daily, RBOB proxy)
    pub const GASOLINE_LA: &str = "DRGASLA";
    /// No. 2 Heating Oil, U.S. Gulf Coast (daily, ULSD proxy)
    pub const HEATING_OIL_GULF: &str = "DHOILUSGULF";
    /// Ultra-Low-Sulfur No. 2 Diesel, U.S. Gulf Coast (daily)
    pub const ULSD_GULF: &str = "DDFUELUSGASDOWN";
    /// Global price of LNG, Asia (monthly, JKM proxy)
    pub const LNG_ASIA: &str = "PNGASJPUSDM";
}

/// Raw observation as FRED returns it (value "." marks a gap)
#[derive(Debug, Clone, Deserialize)]
pub struct RawObservation {
    pub date: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
struct ObservationsResponse {
    #[serde(default)]
    observations: Vec<RawObservation>,
}

/// FRED API client
#[derive(Debug, Clone)]
pub struct FredClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    retry: RetryPolicy,
}

impl FredClient {
    /// Create a new FRED client
    ///
    /// # Arguments
    /// * `api_key` - FRED API key
    /// * `rate_limit` - Requests per minute (default 120)
    pub fn new(api_key: impl Into<String>, rate_limit: Option<u32>) -> Self {
        let burst = NonZeroU32::new(rate_limit.unwrap_or(120)).unwrap_or(NonZeroU32::MIN);
        let rate_limiter = Arc::new(RateLimiter::direct(Quota::per_minute(burst)));

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: FRED_BASE_URL.to_string(),
            rate_limiter,
            retry: RetryPolicy::default(),
        }
    }

    /// Create from environment variable FRED_API_KEY
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("FRED_API_KEY").map_err(|_| {
            ReportError::ConfigError("FRED_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self::new(api_key, None))
    }

    /// Client for `config`, or `None` when no FRED key is configured
    pub fn from_config(config: &ReportConfig) -> Result<Option<Self>> {
        let Some(key) = config.fred_api_key.as_deref() else {
            return Ok(None);
        };

        Ok(Some(
            Self::new(key, None)
                .with_client(http_client(config)?)
                .with_base_url(&config.fred_base_url)
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

    /// Get raw observations for a series, oldest first
    #[instrument(skip(self), fields(provider = "fred"))]
    pub async fn get_observations(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        frequency: Option<&str>,
    ) -> Result<Vec<RawObservation>> {
        let mut params: Vec<(&str, String)> = vec![
            ("series_id", series_id.to_string()),
            ("api_key", self.api_key.clone()),
            ("file_type", "json".to_string()),
        ];
        if let Some(start) = start {
            params.push(("observation_start", start.format("%Y-%m-%d").to_string()));
        }
        if let Some(frequency) = frequency {
            params.push(("frequency", frequency.to_string()));
        }

        let url = format!("{}/series/observations", self.base_url);
        let (url, params) = (url.as_str(), params.as_slice());

        self.retry
            .execute("fred.observations", move || async move {
                self.rate_limiter.until_ready().await;

                let response = self.client.get(url).query(params).send().await?;
                let response = check_status(response, "FRED").await?;
                let data: ObservationsResponse = response.json().await?;
                Ok(data.observations)
            })
            .await
    }

    /// Fetch a series, dropping gaps and non-numeric values
    pub async fn fetch_series(
        &self,
        series_id: &str,
        start: Option<NaiveDate>,
        frequency: Option<&str>,
    ) -> Result<Series> {
        let raw = self.get_observations(series_id, start, frequency).await?;
        let series = parse_observations(series_id, &raw)?;
        debug!("FRED {} returned {} observations", series_id, series.len());
        Ok(series)
    }
}

/// Turn FRED rows into a series
///
/// Errors when FRED returned nothing or nothing numeric.
pub fn parse_observations(series_id: &str, raw: &[RawObservation]) -> Result<Series> {
    if raw.is_empty() {
        return Err(ReportError::unavailable(
            series_id,
            format!("Nenhuma observação retornada para série {series_id} no FRED."),
        ));
    }

    let observations: Vec<Observation> = raw
        .iter()
        .filter_map(|obs| {
            let value = obs.value.trim();
            if value.is_empty() || value == "." {
                return None;
            }
            let price = value.parse::<f64>().ok()?;
            match NaiveDate::parse_from_str(obs.date.trim(), "%Y-%m-%d") {
                Ok(date) => Some(Observation::new(date, Some(price))),
                Err(_) => {
                    warn!("FRED {}: skipping row with bad date '{}'", series_id, obs.date);
                    None
                }
            }
        })
        .collect();

    if observations.is_empty() {
        return Err(ReportError::unavailable(
            series_id,
            format!("Nenhum valor numérico válido encontrado para série {series_id}."),
        ));
    }

    Ok(Series::new(
        series_id,
        format!("FRED:{series_id}"),
        SeriesSource::Fred,
        observations,
    ))
}

#[async_trait]
impl SeriesFetcher for FredClient {
    fn source(&self) -> SeriesSource {
        SeriesSource::Fred
    }

    async fn fetch(&self, id: &str, start: Option<NaiveDate>) -> Result<Series> {
        self.fetch_series(id, start, None).await
    }

    async fn fetch_at(
        &self,
        id: &str,
        start: Option<NaiveDate>,
        frequency: Option<String>,
    ) -> Result<Series> {
        self.fetch_series(id, start, frequency.as_deref()).await
    }
}
