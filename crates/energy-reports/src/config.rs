//! Configuration shared by the report jobs

use crate::error::{ReportError, Result};
use crate::guard::BrtClock;
use crate::retry::RetryPolicy;
use chrono::FixedOffset;
use std::path::PathBuf;
use std::time::Duration;

pub const FRED_BASE_URL: &str = "https://api.stlouisfed.org/fred";
pub const EIA_BASE_URL: &str = "https://api.eia.gov";
pub const ALPHA_VANTAGE_BASE_URL: &str = "https://www.alphavantage.co/query";

/// Paths, API keys and tuning knobs for the report jobs
#[derive(Debug, Clone)]
pub struct ReportConfig {
    /// Directory for CSVs and generated artifacts
    pub data_dir: PathBuf,

    /// JSON file holding the per-report title counters
    pub counter_path: PathBuf,

    /// Directory holding the per-job `.sent` files
    pub sentinel_dir: PathBuf,

    /// Fixed offset used for "today" (hours east of UTC)
    pub utc_offset_hours: i32,

    /// Percent change at which a move counts as alta/queda
    pub trend_threshold: f64,

    /// Request timeout for data APIs
    pub request_timeout: Duration,

    /// Retry policy for data API calls
    pub retry: RetryPolicy,

    pub fred_api_key: Option<String>,
    pub eia_api_key: Option<String>,
    pub alpha_vantage_api_key: Option<String>,

    pub fred_base_url: String,
    pub eia_base_url: String,
    pub alpha_vantage_base_url: String,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            counter_path: PathBuf::from("data/counters.json"),
            sentinel_dir: PathBuf::from("data/sentinels"),
            utc_offset_hours: -3,
            trend_threshold: 1.0,
            request_timeout: Duration::from_secs(30),
            retry: RetryPolicy::default(),
            fred_api_key: None,
            eia_api_key: None,
            alpha_vantage_api_key: None,
            fred_base_url: FRED_BASE_URL.to_string(),
            eia_base_url: EIA_BASE_URL.to_string(),
            alpha_vantage_base_url: ALPHA_VANTAGE_BASE_URL.to_string(),
        }
    }
}

impl ReportConfig {
    /// Create a new configuration builder
    pub fn builder() -> ReportConfigBuilder {
        ReportConfigBuilder::default()
    }

    /// Defaults overlaid with the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with variables from `lookup`
    ///
    /// Reads `FRED_API_KEY`, `EIA_API_KEY`, `ALPHA_VANTAGE_API_KEY`,
    /// `ENERGY_DATA_DIR`, `ENERGY_COUNTER_PATH`, `ENERGY_SENTINEL_DIR`,
    /// `ENERGY_TREND_THRESHOLD` and `ENERGY_REQUEST_TIMEOUT_SECS`.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let mut builder = Self::builder();

        if let Some(dir) = get("ENERGY_DATA_DIR") {
            builder = builder.data_dir(dir);
        }
        if let Some(path) = get("ENERGY_COUNTER_PATH") {
            builder = builder.counter_path(path);
        }
        if let Some(dir) = get("ENERGY_SENTINEL_DIR") {
            builder = builder.sentinel_dir(dir);
        }
        if let Some(raw) = get("ENERGY_TREND_THRESHOLD") {
            let threshold = raw.parse::<f64>().map_err(|_| {
                ReportError::ConfigError(format!("ENERGY_TREND_THRESHOLD is not a number: {raw}"))
            })?;
            builder = builder.trend_threshold(threshold);
        }
        if let Some(raw) = get("ENERGY_REQUEST_TIMEOUT_SECS") {
            let secs = raw.parse::<u64>().map_err(|_| {
                ReportError::ConfigError(format!("ENERGY_REQUEST_TIMEOUT_SECS is not an integer: {raw}"))
            })?;
            builder = builder.request_timeout(Duration::from_secs(secs));
        }
        if let Some(key) = get("FRED_API_KEY") {
            builder = builder.fred_api_key(key);
        }
        if let Some(key) = get("EIA_API_KEY") {
            builder = builder.eia_api_key(key);
        }
        if let Some(key) = get("ALPHA_VANTAGE_API_KEY") {
            builder = builder.alpha_vantage_api_key(key);
        }

        builder.build()
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        if self.retry.max_attempts == 0 {
            return Err(ReportError::ConfigError(
                "retry.max_attempts must be greater than 0".to_string(),
            ));
        }

        if !self.trend_threshold.is_finite() || self.trend_threshold < 0.0 {
            return Err(ReportError::ConfigError(format!(
                "trend_threshold must be a non-negative number, got {}",
                self.trend_threshold
            )));
        }

        if !(-12..=14).contains(&self.utc_offset_hours) {
            return Err(ReportError::ConfigError(format!(
                "utc_offset_hours out of range: {}",
                self.utc_offset_hours
            )));
        }

        if self.request_timeout.is_zero() {
            return Err(ReportError::ConfigError(
                "request_timeout must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// The fixed offset behind "today"
    pub fn offset(&self) -> FixedOffset {
        FixedOffset::east_opt(self.utc_offset_hours * 3600).unwrap_or_else(BrtClock::brt_offset)
    }

    pub fn clock(&self) -> BrtClock {
        BrtClock::new(self.offset())
    }

    /// Sentinel file for a job, e.g. `gas_daily.sent`
    pub fn sentinel_path(&self, file_name: &str) -> PathBuf {
        self.sentinel_dir.join(file_name)
    }

    /// Path under the data directory
    pub fn data_path(&self, file_name: &str) -> PathBuf {
        self.data_dir.join(file_name)
    }
}

/// Builder for [`ReportConfig`]
#[derive(Debug, Default)]
pub struct ReportConfigBuilder {
    data_dir: Option<PathBuf>,
    counter_path: Option<PathBuf>,
    sentinel_dir: Option<PathBuf>,
    utc_offset_hours: Option<i32>,
    trend_threshold: Option<f64>,
    request_timeout: Option<Duration>,
    retry: Option<RetryPolicy>,
    fred_api_key: Option<String>,
    eia_api_key: Option<String>,
    alpha_vantage_api_key: Option<String>,
    fred_base_url: Option<String>,
    eia_base_url: Option<String>,
    alpha_vantage_base_url: Option<String>,
}

impl ReportConfigBuilder {
    pub fn data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn counter_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.counter_path = Some(path.into());
        self
    }

    pub fn sentinel_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.sentinel_dir = Some(dir.into());
        self
    }

    pub fn utc_offset_hours(mut self, hours: i32) -> Self {
        self.utc_offset_hours = Some(hours);
        self
    }

    pub fn trend_threshold(mut self, threshold: f64) -> Self {
        self.trend_threshold = Some(threshold);
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn retry(mut self, policy: RetryPolicy) -> Self {
        self.retry = Some(policy);
        self
    }

    pub fn fred_api_key(mut self, key: impl Into<String>) -> Self {
        self.fred_api_key = Some(key.into());
        self
    }

    pub fn eia_api_key(mut self, key: impl Into<String>) -> Self {
        self.eia_api_key = Some(key.into());
        self
    }

    pub fn alpha_vantage_api_key(mut self, key: impl Into<String>) -> Self {
        self.alpha_vantage_api_key = Some(key.into());
        self
    }

    /// Point the FRED client somewhere else (mock servers, proxies)
    pub fn fred_base_url(mut self, url: impl Into<String>) -> Self {
        self.fred_base_url = Some(url.into());
        self
    }

    pub fn eia_base_url(mut self, url: impl Into<String>) -> Self {
        self.eia_base_url = Some(url.into());
        self
    }

    pub fn alpha_vantage_base_url(mut self, url: impl Into<String>) -> Self {
        self.alpha_vantage_base_url = Some(url.into());
        self
    }

    /// Build and validate the configuration
    pub fn build(self) -> Result<ReportConfig> {
        let defaults = ReportConfig::default();
        let data_dir = self.data_dir.unwrap_or(defaults.data_dir);

        // Counters and sentinels live under the data directory unless set explicitly
        let counter_path = self
            .counter_path
            .unwrap_or_else(|| data_dir.join("counters.json"));
        let sentinel_dir = self
            .sentinel_dir
            .unwrap_or_else(|| data_dir.join("sentinels"));

        let config = ReportConfig {
            data_dir,
            counter_path,
            sentinel_dir,
            utc_offset_hours: self.utc_offset_hours.unwrap_or(defaults.utc_offset_hours),
            trend_threshold: self.trend_threshold.unwrap_or(defaults.trend_threshold),
            request_timeout: self.request_timeout.unwrap_or(defaults.request_timeout),
            retry: self.retry.unwrap_or(defaults.retry),
            fred_api_key: self.fred_api_key,
            eia_api_key: self.eia_api_key,
            alpha_vantage_api_key: self.alpha_vantage_api_key,
            fred_base_url: trim_url(self.fred_base_url.unwrap_or(defaults.fred_base_url)),
            eia_base_url: trim_url(self.eia_base_url.unwrap_or(defaults.eia_base_url)),
            alpha_vantage_base_url: trim_url(
                self.alpha_vantage_base_url
                    .unwrap_or(defaults.alpha_vantage_base_url),
            ),
        };

        config.validate()?;
        Ok(config)
    }
}

fn trim_url(url: String) -> String {
    url.trim_end_matches('/').to_string()
}
