//! Alpha Vantage API client
//!
//! Used for the commodity endpoints (`function=WTI`, `BRENT`,
//! `NATURAL_GAS`, ...) and, for any other id, the daily close of a ticker.

use super::{SharedRateLimiter, check_status, http_client};
use crate::config::{ALPHA_VANTAGE_BASE_URL, ReportConfig};
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
use tracing::{debug, instrument};

/// Functions served by the commodity endpoints
pub const COMMODITY_FUNCTIONS: &[&str] = &[
    "WTI",
    "BRENT",
    "NATURAL_GAS",
    "COPPER",
    "ALUMINUM",
    "WHEAT",
    "CORN",
    "COTTON",
    "SUGAR",
    "COFFEE",
    "ALL_COMMODITIES",
];

/// Alpha Vantage API client
#[derive(Debug, Clone)]
pub struct AlphaVantageClient {
    client: Client,
    api_key: String,
    base_url: String,
    rate_limiter: SharedRateLimiter,
    retry: RetryPolicy,
}

impl AlphaVantageClient {
    /// Create a new Alpha Vantage client with API key and rate limit
    ///
    /// # Arguments
    /// * `api_key` - Alpha Vantage API key
    /// * `rate_limit` - Maximum requests per minute (5 on the free tier)
    pub fn new(api_key: impl Into<String>, rate_limit: u32) -> Self {
        let burst = NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN);

        Self {
            client: Client::new(),
            api_key: api_key.into(),
            base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
            rate_limiter: Arc::new(RateLimiter::direct(Quota::per_minute(burst))),
            retry: RetryPolicy::default(),
        }
    }

    /// Create from environment variable ALPHA_VANTAGE_API_KEY with default rate limit
    pub fn from_env() -> Result<Self> {
        let api_key = std::env::var("ALPHA_VANTAGE_API_KEY").map_err(|_| {
            ReportError::ConfigError("ALPHA_VANTAGE_API_KEY environment variable not set".to_string())
        })?;

        Ok(Self::new(api_key, 5))
    }

    /// Client for `config`, or `None` when no key is configured
    pub fn from_config(config: &ReportConfig) -> Result<Option<Self>> {
        let Some(key) = config.alpha_vantage_api_key.as_deref() else {
            return Ok(None);
        };

        Ok(Some(
            Self::new(key, 5)
                .with_client(http_client(config)?)
                .with_base_url(&config.alpha_vantage_base_url)
                .with_retry(config.retry.clone()),
        ))
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
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

    #[instrument(skip(self, params), fields(provider = "alpha_vantage"))]
    async fn query(&self, function: &str, params: &[(&str, &str)]) -> Result<Value> {
        let mut query: Vec<(&str, &str)> = vec![("function", function), ("apikey", self.api_key.as_str())];
        query.extend_from_slice(params);
        let query = query.as_slice();
        let url = self.base_url.as_str();

        self.retry
            .execute("alpha_vantage.query", move || async move {
                self.rate_limiter.until_ready().await;

                let response = self.client.get(url).query(query).send().await?;
                let response = check_status(response, "Alpha Vantage").await?;
                let data: Value = response.json().await?;
                check_payload(&data)?;
                Ok(data)
            })
            .await
    }

    /// Daily commodity prices (`function=WTI` and friends)
    pub async fn get_commodity(&self, function: &str) -> Result<Series> {
        let data = self.query(function, &[("interval", "daily")]).await?;
        parse_commodity(function, &data)
    }

    /// Daily closing prices for a ticker
    pub async fn get_daily_close(&self, symbol: &str) -> Result<Series> {
        let data = self
            .query("TIME_SERIES_DAILY", &[("symbol", symbol), ("outputsize", "compact")])
            .await?;
        parse_daily_close(symbol, &data)
    }
}

/// Error and throttling messages arrive with HTTP 200
fn check_payload(data: &Value) -> Result<()> {
    if let Some(error) = data.get("Error Message") {
        return Err(ReportError::ApiError(format!("Alpha Vantage error: {error}")));
    }

    if data.get("Note").is_some() || data.get("Information").is_some() {
        return Err(ReportError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        });
    }

    Ok(())
}

/// Parse a commodity document (`data[] {date, value}`, "." for gaps)
pub fn parse_commodity(function: &str, data: &Value) -> Result<Series> {
    let rows = data
        .get("data")
        .and_then(Value::as_array)
        .ok_or_else(|| ReportError::unavailable(function, "Alpha Vantage returned no data"))?;

    let observations: Vec<Observation> = rows
        .iter()
        .filter_map(|row| {
            let date = row.get("date").and_then(Value::as_str)?;
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let value = row
                .get("value")
                .and_then(Value::as_str)
                .and_then(|v| v.trim().parse::<f64>().ok());
            Some(Observation::new(date, value))
        })
        .collect();

    if observations.iter().all(|o| o.value.is_none()) {
        return Err(ReportError::unavailable(function, "no numeric values"));
    }

    let label = data
        .get("name")
        .and_then(Value::as_str)
        .unwrap_or(function)
        .to_string();
    debug!("Alpha Vantage {} returned {} rows", function, observations.len());
    Ok(Series::new(function, label, SeriesSource::AlphaVantage, observations))
}

/// Parse `"Time Series (Daily)"` closes
pub fn parse_daily_close(symbol: &str, data: &Value) -> Result<Series> {
    let series = data
        .get("Time Series (Daily)")
        .and_then(Value::as_object)
        .filter(|m| !m.is_empty())
        .ok_or_else(|| {
            ReportError::unavailable(symbol, "Alpha Vantage returned no time series for symbol")
        })?;

    let observations = series
        .iter()
        .filter_map(|(date, bar)| {
            let date = NaiveDate::parse_from_str(date, "%Y-%m-%d").ok()?;
            let close = bar
                .get("4. close")
                .and_then(Value::as_str)
                .and_then(|v| v.parse::<f64>().ok());
            Some(Observation::new(date, close))
        })
        .collect();

    Ok(Series::new(symbol, symbol, SeriesSource::AlphaVantage, observations))
}

#[async_trait]
impl SeriesFetcher for AlphaVantageClient {
    fn source(&self) -> SeriesSource {
        SeriesSource::AlphaVantage
    }

    async fn fetch(&self, id: &str, start: Option<NaiveDate>) -> Result<Series> {
        let function = id.trim().to_ascii_uppercase();
        let mut series = if COMMODITY_FUNCTIONS.contains(&function.as_str()) {
            self.get_commodity(&function).await?
        } else {
            self.get_daily_close(id.trim()).await?
        };

        if let Some(start) = start {
            series.observations.retain(|o| o.date >= start);
        }
        Ok(series)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client(server: &MockServer) -> AlphaVantageClient {
        AlphaVantageClient::new("demo", 60)
            .with_base_url(format!("{}/query", server.uri()))
            .with_retry(RetryPolicy::no_retry())
    }

    #[test]
    fn test_parse_commodity() {
        let data = json!({
            "name": "Crude Oil Prices: Brent - Europe",
            "unit": "dollars per barrel",
            "data": [
                {"date": "2025-03-04", "value": "71.04"},
                {"date": "2025-03-03", "value": "."},
                {"date": "2025-02-28", "value": "73.18"}
            ]
        });
        let series = parse_commodity("BRENT", &data).unwrap();
        assert_eq!(series.label, "Crude Oil Prices: Brent - Europe");
        assert_eq!(series.len(), 3);
        assert_eq!(series.last().unwrap().value, Some(71.04));
        assert_eq!(series.observations[1].value, None);
    }

    #[test]
    fn test_parse_daily_close() {
        let data = json!({
            "Time Series (Daily)": {
                "2025-03-04": {"1. open": "3.9", "4. close": "4.12"},
                "2025-03-03": {"1. open": "3.7", "4. close": "3.95"}
            }
        });
        let series = parse_daily_close("UNG", &data).unwrap();
        assert_eq!(series.first().unwrap().value, Some(3.95));
        assert!(parse_daily_close("UNG", &json!({})).is_err());
    }

    #[test]
    fn test_payload_errors() {
        assert!(matches!(
            check_payload(&json!({"Note": "Thank you for using Alpha Vantage!"})),
            Err(ReportError::RateLimitExceeded { .. })
        ));
        assert!(matches!(
            check_payload(&json!({"Information": "rate limit"})),
            Err(ReportError::RateLimitExceeded { .. })
        ));
        assert!(matches!(
            check_payload(&json!({"Error Message": "Invalid API call"})),
            Err(ReportError::ApiError(_))
        ));
    }

    #[tokio::test]
    async fn test_fetch_routes_commodities() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("function", "WTI"))
            .and(query_param("interval", "daily"))
            .and(query_param("apikey", "demo"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "name": "WTI",
                "data": [{"date": "2025-03-04", "value": "68.26"}]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let series = client(&server).fetch("wti", None).await.unwrap();
        assert_eq!(series.id, "WTI");
        assert_eq!(series.last().unwrap().value, Some(68.26));
    }

    #[tokio::test]
    async fn test_fetch_surfaces_rate_limit() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Note": "Our standard API call frequency is 5 calls per minute"
            })))
            .mount(&server)
            .await;

        let err = client(&server).fetch("BRENT", None).await.unwrap_err();
        assert!(matches!(err, ReportError::RateLimitExceeded { .. }));
    }
}
