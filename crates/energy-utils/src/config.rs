//! Process-wide settings shared by every job

use crate::env::non_empty;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Log output format
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable lines
    #[default]
    Text,
    /// One JSON object per event
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "text" | "pretty" | "plain" => Ok(LogFormat::Text),
            "json" => Ok(LogFormat::Json),
            other => Err(format!("unknown log format '{other}'")),
        }
    }
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Application name
    pub app_name: String,
    /// Environment (development, ci, ...)
    pub environment: String,
    /// Log output format, from `ENERGY_LOG_FORMAT`
    pub log_format: LogFormat,
}

impl Config {
    /// Read settings from the process environment
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read settings through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let environment = non_empty(lookup("ENERGY_ENV")).unwrap_or_else(|| {
            if non_empty(lookup("GITHUB_ACTIONS")).is_some() {
                "ci".to_string()
            } else {
                defaults.environment.clone()
            }
        });
        let log_format = non_empty(lookup("ENERGY_LOG_FORMAT"))
            .and_then(|v| v.parse().ok())
            .unwrap_or_default();

        Self {
            environment,
            log_format,
            ..defaults
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            app_name: "energy".to_string(),
            environment: "development".to_string(),
            log_format: LogFormat::Text,
        }
    }
}
