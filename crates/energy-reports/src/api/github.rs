//! Minimal GitHub REST client for the watchdog
//!
//! Reads a file through the contents API and lists workflows and their runs.

use crate::error::{ReportError, Result};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, instrument};

const GITHUB_API_URL: &str = "https://api.github.com";

/// A workflow definition
#[derive(Debug, Clone, Deserialize)]
pub struct Workflow {
    pub id: u64,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub path: String,
}

/// One run of a workflow
#[derive(Debug, Clone, Deserialize)]
pub struct WorkflowRun {
    pub id: u64,
    #[serde(default)]
    pub conclusion: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct WorkflowsResponse {
    #[serde(default)]
    workflows: Vec<Workflow>,
}

#[derive(Debug, Deserialize)]
struct RunsResponse {
    #[serde(default)]
    workflow_runs: Vec<WorkflowRun>,
}

#[derive(Debug, Deserialize)]
struct ContentsResponse {
    #[serde(default)]
    content: String,
}

/// GitHub REST client bound to one repository
#[derive(Debug, Clone)]
pub struct GitHubClient {
    client: Client,
    token: String,
    repo: String,
    base_url: String,
}

impl GitHubClient {
    /// Client for `owner/name` authenticated with `token`
    pub fn new(repo: impl Into<String>, token: impl Into<String>) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .user_agent(concat!("energy-reports/", env!("CARGO_PKG_VERSION")))
            .build()?;

        Ok(Self {
            client,
            token: token.into(),
            repo: repo.into(),
            base_url: GITHUB_API_URL.to_string(),
        })
    }

    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    pub fn repo(&self) -> &str {
        &self.repo
    }

    fn get(&self, path: &str) -> reqwest::RequestBuilder {
        self.client
            .get(format!("{}/repos/{}/{}", self.base_url, self.repo, path))
            .bearer_auth(&self.token)
            .header("Accept", "application/vnd.github+json")
    }

    /// Decoded text of a repository file, `None` when the API does not serve it
    #[instrument(skip(self))]
    pub async fn file_content(&self, path: &str) -> Result<Option<String>> {
        let response = self.get(&format!("contents/{path}")).send().await?;
        if response.status() != StatusCode::OK {
            debug!("Contents request for {} returned {}", path, response.status());
            return Ok(None);
        }

        let payload: ContentsResponse = response.json().await?;
        if payload.content.is_empty() {
            return Ok(None);
        }

        // the API wraps base64 at 60 columns
        let compact: String = payload
            .content
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();
        let bytes = STANDARD
            .decode(compact)
            .map_err(|e| ReportError::ApiError(format!("invalid base64 in {path}: {e}")))?;

        Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
    }

    /// All workflows of the repository
    #[instrument(skip(self))]
    pub async fn workflows(&self) -> Result<Vec<Workflow>> {
        let response = self.get("actions/workflows").send().await?;
        if !response.status().is_success() {
            return Err(ReportError::ApiError(format!(
                "list workflows failed: {}",
                response.status()
            )));
        }
        let data: WorkflowsResponse = response.json().await?;
        Ok(data.workflows)
    }

    /// One page of runs; `None` when the page request was rejected
    #[instrument(skip(self))]
    pub async fn workflow_runs(
        &self,
        workflow_id: u64,
        page: u32,
        per_page: u32,
    ) -> Result<Option<Vec<WorkflowRun>>> {
        let response = self
            .get(&format!("actions/workflows/{workflow_id}/runs"))
            .query(&[("per_page", per_page), ("page", page)])
            .send()
            .await?;

        if !response.status().is_success() {
            debug!("Runs request page {} returned {}", page, response.status());
            return Ok(None);
        }
        let data: RunsResponse = response.json().await?;
        Ok(Some(data.workflow_runs))
    }
}
