//! Error types for the report jobs

use thiserror::Error;

/// Errors raised while fetching, computing, rendering or delivering a report
#[derive(Debug, Error)]
pub enum ReportError {
    /// API answered with an error payload or a non-success status
    #[error("API error: {0}")]
    ApiError(String),

    /// Series id or reference string could not be understood
    #[error("Invalid series reference: {0}")]
    InvalidSeries(String),

    /// The provider answered but had no usable rows
    #[error("Data not available for {series}: {reason}")]
    DataUnavailable { series: String, reason: String },

    /// Every configured source for a series failed
    #[error("All sources failed for {series}: {details}")]
    AllSourcesFailed { series: String, details: String },

    /// Rate limit exceeded for API
    #[error("Rate limit exceeded for {provider}")]
    RateLimitExceeded { provider: String },

    /// Network or HTTP error
    #[error("Network error: {0}")]
    NetworkError(#[from] reqwest::Error),

    /// JSON parsing error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// CSV read or write error
    #[error("CSV error: {0}")]
    CsvError(#[from] csv::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Date parsing error
    #[error("Date error: {0}")]
    DateError(#[from] chrono::ParseError),

    /// Chat delivery failed
    #[error("Delivery error: {0}")]
    DeliveryError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(String),

    /// LLM generation failed
    #[error(transparent)]
    Llm(#[from] energy_llm::LLMError),

    /// Prompt rendering failed
    #[error(transparent)]
    Prompt(#[from] energy_prompt::PromptError),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

impl ReportError {
    /// Shorthand for [`ReportError::DataUnavailable`]
    pub fn unavailable(series: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::DataUnavailable {
            series: series.into(),
            reason: reason.into(),
        }
    }

    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        match self {
            Self::NetworkError(e) => {
                e.is_timeout()
                    || e.is_connect()
                    || e.status().is_some_and(|s| s.is_server_error() || s.as_u16() == 429)
            }
            Self::RateLimitExceeded { .. } => true,
            _ => false,
        }
    }
}

/// Result type alias for report operations
pub type Result<T> = std::result::Result<T, ReportError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = ReportError::unavailable("PET.WCESTUS1.W", "no rows");
        assert_eq!(err.to_string(), "Data not available for PET.WCESTUS1.W: no rows");

        let err = ReportError::RateLimitExceeded {
            provider: "Alpha Vantage".to_string(),
        };
        assert_eq!(err.to_string(), "Rate limit exceeded for Alpha Vantage");
    }

    #[test]
    fn test_transient_classification() {
        assert!(
            ReportError::RateLimitExceeded {
                provider: "FRED".to_string()
            }
            .is_transient()
        );
        assert!(!ReportError::ConfigError("missing key".to_string()).is_transient());
        assert!(!ReportError::unavailable("X", "empty").is_transient());
    }

    #[test]
    fn test_llm_error_is_transparent() {
        let err: ReportError = energy_llm::LLMError::EmptyResponse("groq".to_string()).into();
        assert_eq!(err.to_string(), "Empty response from groq");
    }
}
