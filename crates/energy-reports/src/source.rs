//! Source selection: which API serves a series, with ordered fallback

use crate::api::{AlphaVantageClient, EiaClient, FredClient};
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::series::{Series, SeriesSource};
use async_trait::async_trait;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Anything that can fetch a named series
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SeriesFetcher: Send + Sync {
    /// API this fetcher talks to
    fn source(&self) -> SeriesSource;

    /// Fetch series `id`, optionally from `start` onwards
    async fn fetch(&self, id: &str, start: Option<NaiveDate>) -> Result<Series>;

    /// Like [`fetch`](Self::fetch), aggregated to `frequency` where the API supports it
    async fn fetch_at(
        &self,
        id: &str,
        start: Option<NaiveDate>,
        frequency: Option<String>,
    ) -> Result<Series> {
        if let Some(frequency) = frequency {
            debug!("{} ignores frequency '{}' for {}", self.source().tag(), frequency, id);
        }
        self.fetch(id, start).await
    }
}

/// `source:id` pointer such as `fred:DCOILWTICO` or `eia:PET.WCESTUS1.W`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SeriesRef {
    pub source: SeriesSource,
    pub id: String,
}

impl SeriesRef {
    pub fn new(source: SeriesSource, id: impl Into<String>) -> Self {
        Self {
            source,
            id: id.into(),
        }
    }

    pub fn fred(id: impl Into<String>) -> Self {
        Self::new(SeriesSource::Fred, id)
    }

    pub fn eia(id: impl Into<String>) -> Self {
        Self::new(SeriesSource::Eia, id)
    }

    pub fn alpha(id: impl Into<String>) -> Self {
        Self::new(SeriesSource::AlphaVantage, id)
    }
}

impl fmt::Display for SeriesRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.source.tag().to_lowercase(), self.id)
    }
}

impl FromStr for SeriesRef {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        let (source, id) = s
            .trim()
            .split_once(':')
            .ok_or_else(|| ReportError::InvalidSeries(format!("expected source:id, got '{s}'")))?;

        let id = id.trim();
        if id.is_empty() {
            return Err(ReportError::InvalidSeries(format!("missing series id in '{s}'")));
        }

        Ok(Self::new(source.parse()?, id))
    }
}

/// The fetchers available to a job, keyed by source
#[derive(Clone, Default)]
pub struct DataSources {
    fetchers: HashMap<SeriesSource, Arc<dyn SeriesFetcher>>,
}

impl fmt::Debug for DataSources {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut sources: Vec<_> = self.fetchers.keys().map(|s| s.tag()).collect();
        sources.sort_unstable();
        f.debug_struct("DataSources").field("sources", &sources).finish()
    }
}

impl DataSources {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clients for every API whose key is present in `config`
    pub fn from_config(config: &ReportConfig) -> Result<Self> {
        let mut sources = Self::new();
        if let Some(client) = FredClient::from_config(config)? {
            sources = sources.with(Arc::new(client));
        }
        if let Some(client) = EiaClient::from_config(config)? {
            sources = sources.with(Arc::new(client));
        }
        if let Some(client) = AlphaVantageClient::from_config(config)? {
            sources = sources.with(Arc::new(client));
        }
        debug!("Configured data sources: {:?}", sources);
        Ok(sources)
    }

    /// Register a fetcher under its own source
    #[must_use]
    pub fn with(mut self, fetcher: Arc<dyn SeriesFetcher>) -> Self {
        self.fetchers.insert(fetcher.source(), fetcher);
        self
    }

    pub fn get(&self, source: SeriesSource) -> Option<&Arc<dyn SeriesFetcher>> {
        self.fetchers.get(&source)
    }

    pub fn has(&self, source: SeriesSource) -> bool {
        self.fetchers.contains_key(&source)
    }

    /// Fetch one reference, failing when its source is not configured
    pub async fn fetch(&self, series: &SeriesRef, start: Option<NaiveDate>) -> Result<Series> {
        let fetcher = self.get(series.source).ok_or_else(|| {
            ReportError::ConfigError(format!(
                "{} not set, cannot fetch {}",
                series.source.api_key_var(),
                series
            ))
        })?;
        fetcher.fetch(&series.id, start).await
    }
}

/// Ordered list of places a series can come from
#[derive(Debug, Clone)]
pub struct SourceChain {
    name: String,
    refs: Vec<SeriesRef>,
}

impl SourceChain {
    pub fn new(name: impl Into<String>, refs: Vec<SeriesRef>) -> Self {
        Self {
            name: name.into(),
            refs,
        }
    }

    /// Parse a comma-separated list such as `"eia:NG.RNGWHHD.D,fred:DHHNGSP"`
    pub fn parse(name: impl Into<String>, list: &str) -> Result<Self> {
        let refs = list
            .split(',')
            .filter(|s| !s.trim().is_empty())
            .map(str::parse)
            .collect::<Result<Vec<SeriesRef>>>()?;
        Ok(Self::new(name, refs))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn refs(&self) -> &[SeriesRef] {
        &self.refs
    }

    /// First successful fetch, skipping sources without a configured client
    pub async fn fetch(&self, sources: &DataSources, start: Option<NaiveDate>) -> Result<Series> {
        let mut failures = Vec::new();

        for series_ref in &self.refs {
            let Some(fetcher) = sources.get(series_ref.source) else {
                debug!("{}: skipping {} ({} not set)", self.name, series_ref, series_ref.source.api_key_var());
                failures.push(format!("{series_ref}: {} not set", series_ref.source.api_key_var()));
                continue;
            };

            match fetcher.fetch(&series_ref.id, start).await {
                Ok(series) => {
                    info!("{}: fetched {} ({} observations)", self.name, series_ref, series.len());
                    return Ok(series);
                }
                Err(e) => {
                    warn!("{}: {} failed: {}", self.name, series_ref, e);
                    failures.push(format!("{series_ref}: {e}"));
                }
            }
        }

        if failures.is_empty() {
            failures.push("no sources listed".to_string());
        }

        Err(ReportError::AllSourcesFailed {
            series: self.name.clone(),
            details: failures.join("; "),
        })
    }
}
