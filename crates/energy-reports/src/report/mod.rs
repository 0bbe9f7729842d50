//! Report renderers
//!
//! - [`daily`]: context block, plain fallback report and final HTML message
//! - [`inventory`]: the three weekly inventory messages
//! - [`weekly`]: weekly macro summary
//! - [`dashboard`]: Markdown and HTML dashboards

pub mod daily;
pub mod dashboard;
pub mod inventory;
pub mod weekly;

use crate::commodity::Commodity;
use crate::error::Result;
use crate::metrics::PriceSummary;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Price summary of one leg (oil has WTI and Brent)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LegSummary {
    pub name: String,
    pub summary: PriceSummary,
}

impl LegSummary {
    pub fn new(name: impl Into<String>, summary: PriceSummary) -> Self {
        Self {
            name: name.into(),
            summary,
        }
    }
}

/// Machine-readable record of a delivered daily report
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportArtifact {
    pub commodity: Commodity,
    pub title: String,
    pub generated_at: DateTime<Utc>,
    pub stats: Vec<LegSummary>,
    /// `None` for the plain report
    pub provider: Option<String>,
    pub elapsed_secs: Option<f64>,
    pub text: String,
}

impl ReportArtifact {
    /// File name used when writing or attaching, e.g. `jet-fuel_2025-03-04.json`
    pub fn file_name(&self) -> String {
        format!(
            "{}_{}.json",
            self.commodity.slug(),
            self.generated_at.format("%Y-%m-%d")
        )
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write pretty JSON to `path`, creating parent directories
    pub fn write(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }

    pub fn read(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }
}
