//! HTTP clients for the statistical and repository APIs

pub mod alpha_vantage;
pub mod eia;
pub mod fred;
pub mod github;

pub use alpha_vantage::AlphaVantageClient;
pub use eia::EiaClient;
pub use fred::{FredClient, series as fred_series};
pub use github::{GitHubClient, Workflow, WorkflowRun};

use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::RateLimiter;
use reqwest::{Client, Response};
use std::sync::Arc;

pub(crate) type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// HTTP client carrying the configured request timeout
pub(crate) fn http_client(config: &ReportConfig) -> Result<Client> {
    Ok(Client::builder().timeout(config.request_timeout).build()?)
}

/// Map a non-success response onto the error taxonomy
///
/// 429 becomes a rate-limit error and 5xx keeps the `reqwest` status error,
/// so both are retried; other statuses carry the body for diagnosis.
pub(crate) async fn check_status(response: Response, provider: &str) -> Result<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    if status.as_u16() == 429 {
        return Err(ReportError::RateLimitExceeded {
            provider: provider.to_string(),
        });
    }

    if status.is_server_error() {
        if let Err(e) = response.error_for_status_ref() {
            return Err(e.into());
        }
    }

    let body = response.text().await.unwrap_or_default();
    let body: String = body.chars().take(300).collect();
    Err(ReportError::ApiError(format!("{provider} API error: {status}: {body}")))
}
