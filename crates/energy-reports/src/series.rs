//! Time-series model and CSV persistence
//!
//! A [`Series`] is the common currency between the data clients, the metrics
//! and the renderers. Observations are always sorted ascending by date.

use crate::error::{ReportError, Result};
use chrono::{DateTime, NaiveDate, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, warn};

/// Statistical API a series comes from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SeriesSource {
    Fred,
    Eia,
    AlphaVantage,
}

impl SeriesSource {
    /// Tag used in CSV `source` columns and labels
    pub fn tag(self) -> &'static str {
        match self {
            SeriesSource::Fred => "FRED",
            SeriesSource::Eia => "EIA",
            SeriesSource::AlphaVantage => "AlphaVantage",
        }
    }

    /// Environment variable holding the API key
    pub fn api_key_var(self) -> &'static str {
        match self {
            SeriesSource::Fred => "FRED_API_KEY",
            SeriesSource::Eia => "EIA_API_KEY",
            SeriesSource::AlphaVantage => "ALPHA_VANTAGE_API_KEY",
        }
    }
}

impl fmt::Display for SeriesSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.tag())
    }
}

impl FromStr for SeriesSource {
    type Err = ReportError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "fred" => Ok(SeriesSource::Fred),
            "eia" => Ok(SeriesSource::Eia),
            "alpha" | "av" | "alphavantage" | "alpha_vantage" | "alpha-vantage" => {
                Ok(SeriesSource::AlphaVantage)
            }
            other => Err(ReportError::InvalidSeries(format!("unknown source '{other}'"))),
        }
    }
}

/// One dated reading; `value` is `None` when the provider published a gap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub date: NaiveDate,
    pub value: Option<f64>,
}

impl Observation {
    pub fn new(date: NaiveDate, value: Option<f64>) -> Self {
        Self { date, value }
    }
}

/// A named, date-ordered sequence of observations
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub id: String,
    pub label: String,
    pub source: SeriesSource,
    pub observations: Vec<Observation>,
    pub retrieved_at: DateTime<Utc>,
}

impl Series {
    /// Build a series, sorting the observations by date
    pub fn new(
        id: impl Into<String>,
        label: impl Into<String>,
        source: SeriesSource,
        mut observations: Vec<Observation>,
    ) -> Self {
        observations.sort_by_key(|o| o.date);
        Self {
            id: id.into(),
            label: label.into(),
            source,
            observations,
            retrieved_at: Utc::now(),
        }
    }

    #[must_use]
    pub fn with_retrieved_at(mut self, at: DateTime<Utc>) -> Self {
        self.retrieved_at = at;
        self
    }

    pub fn len(&self) -> usize {
        self.observations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observations.is_empty()
    }

    pub fn first(&self) -> Option<&Observation> {
        self.observations.first()
    }

    pub fn last(&self) -> Option<&Observation> {
        self.observations.last()
    }

    /// `(date, value)` pairs that carry a value
    pub fn valued(&self) -> impl Iterator<Item = (NaiveDate, f64)> + '_ {
        self.observations
            .iter()
            .filter_map(|o| o.value.map(|v| (o.date, v)))
    }

    /// Source tag written to price CSVs, e.g. `FRED:DJFUELUSGULF`
    pub fn source_tag(&self) -> String {
        format!("{}:{}", self.source.tag(), self.id)
    }
}

/// Header of the value column in an inventory CSV
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueColumn {
    /// Petroleum stocks (`value`)
    Value,
    /// Gas storage (`storage_bcf`)
    StorageBcf,
}

impl ValueColumn {
    pub fn header(self) -> &'static str {
        match self {
            ValueColumn::Value => "value",
            ValueColumn::StorageBcf => "storage_bcf",
        }
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    Ok(())
}

fn format_value(value: Option<f64>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// Write `date,price,source` rows, skipping gaps
pub fn write_price_csv(series: &Series, path: &Path) -> Result<usize> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", "price", "source"])?;

    let source = series.source_tag();
    let mut rows = 0;
    for (date, price) in series.valued() {
        writer.write_record([date.to_string(), price.to_string(), source.clone()])?;
        rows += 1;
    }
    writer.flush()?;

    debug!("Wrote {} price rows to {}", rows, path.display());
    Ok(rows)
}

/// Write `date,<value column>,series_id,label,retrieved_at` rows
pub fn write_inventory_csv(series: &Series, column: ValueColumn, path: &Path) -> Result<usize> {
    create_parent(path)?;
    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(["date", column.header(), "series_id", "label", "retrieved_at"])?;

    let retrieved_at = series
        .retrieved_at
        .to_rfc3339_opts(SecondsFormat::Secs, true);
    for obs in &series.observations {
        writer.write_record([
            obs.date.to_string(),
            format_value(obs.value),
            series.id.clone(),
            series.label.clone(),
            retrieved_at.clone(),
        ])?;
    }
    writer.flush()?;

    debug!("Wrote {} inventory rows to {}", series.len(), path.display());
    Ok(series.len())
}

/// Parse a CSV date cell; timestamps are cut to their date part
pub fn parse_csv_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    let day = raw.get(..10).unwrap_or(raw);
    NaiveDate::parse_from_str(day, "%Y-%m-%d").ok()
}

/// Read a price or inventory CSV back into a [`Series`]
///
/// The value column may be `storage_bcf`, `value` or `price`. Empty values
/// become gaps; rows without a parseable date are dropped.
pub fn read_series_csv(path: &Path) -> Result<Series> {
    let mut reader = csv::Reader::from_path(path)?;
    let headers = reader.headers()?.clone();
    let column = |name: &str| headers.iter().position(|h| h.trim() == name);

    let date_idx = column("date").ok_or_else(|| {
        ReportError::unavailable(path.display().to_string(), "missing 'date' column")
    })?;
    let value_idx = column("storage_bcf")
        .or_else(|| column("value"))
        .or_else(|| column("price"))
        .ok_or_else(|| {
            ReportError::unavailable(path.display().to_string(), "missing value column")
        })?;
    let id_idx = column("series_id");
    let label_idx = column("label");
    let source_idx = column("source");

    let mut observations = Vec::new();
    // series_id, label and source come from the newest row
    let mut newest: Option<NaiveDate> = None;
    let mut id = None;
    let mut label = None;
    let mut source = None;

    for record in reader.records() {
        let record = record?;
        let Some(date) = record.get(date_idx).and_then(parse_csv_date) else {
            warn!("Skipping row with unparseable date in {}", path.display());
            continue;
        };
        let value = record
            .get(value_idx)
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .and_then(|v| v.parse::<f64>().ok());
        observations.push(Observation::new(date, value));

        if newest.is_none_or(|d| date >= d) {
            newest = Some(date);
            let cell = |idx: Option<usize>| idx.and_then(|i| record.get(i)).map(|v| v.trim().to_string());
            id = cell(id_idx);
            label = cell(label_idx);
            source = cell(source_idx);
        }
    }

    // price CSVs carry "FRED:<id>" in the source column
    let (source, id) = match source.as_deref().and_then(|s| s.split_once(':')) {
        Some((tag, sid)) => (tag.parse().unwrap_or(SeriesSource::Fred), id.unwrap_or_else(|| sid.to_string())),
        None => {
            let fallback = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            (SeriesSource::Eia, id.unwrap_or(fallback))
        }
    };
    // a blank label cell stays blank; only files without the column borrow the id
    let label = label.unwrap_or_else(|| id.clone());

    Ok(Series::new(id, label, source, observations))
}
