//! Did the main daily job already deliver today?
//!
//! A backup workflow runs this before sending anything itself. The answer
//! comes from the sentinel committed to the repository or, failing that, from
//! a successful run of the main workflow created today (UTC−3). Both checks
//! are repeated until `max_wait` elapses.

use crate::api::{GitHubClient, Workflow, WorkflowRun};
use crate::error::Result;
use crate::guard::{BrtClock, parse_last_sent};
use chrono::NaiveDate;
use std::time::Duration;
use tokio::time::{Instant, sleep};
use tracing::{debug, info, warn};

const RUN_PAGES: u32 = 2;
const RUNS_PER_PAGE: u32 = 100;

/// Watchdog settings
#[derive(Debug, Clone)]
pub struct WatchdogConfig {
    /// `owner/name`
    pub repo: String,
    pub token: String,
    /// Sentinel path inside the repository
    pub sentinel_path: String,
    /// Workflow file names of the main job
    pub workflow_files: Vec<String>,
    pub max_wait: Duration,
    pub interval: Duration,
}

impl WatchdogConfig {
    pub const DEFAULT_SENTINEL: &'static str = "data/sentinels/oil_daily.sent";
    pub const DEFAULT_MAX_WAIT_SECS: u64 = 90;
    pub const DEFAULT_INTERVAL_SECS: u64 = 10;

    /// `None` when `GITHUB_REPOSITORY` or `GITHUB_TOKEN` is missing
    pub fn from_env() -> Option<Self> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Option<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |var: &str| lookup(var).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());
        let secs = |var: &str, default: u64| {
            Duration::from_secs(get(var).and_then(|v| v.parse().ok()).unwrap_or(default))
        };

        let repo = get("GITHUB_REPOSITORY")?;
        let token = get("GITHUB_TOKEN")?;

        Some(Self {
            repo,
            token,
            sentinel_path: get("SENTINEL_PATH").unwrap_or_else(|| Self::DEFAULT_SENTINEL.to_string()),
            workflow_files: vec!["oil_daily.yml".to_string(), "oil_daily.yaml".to_string()],
            max_wait: secs("CHECK_MAIN_MAX_WAIT", Self::DEFAULT_MAX_WAIT_SECS),
            interval: secs("CHECK_MAIN_INTERVAL", Self::DEFAULT_INTERVAL_SECS),
        })
    }
}

/// Outcome of the watchdog check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// The main job delivered today; the backup must stay quiet
    AlreadySent,
    /// Nothing found before the deadline; the backup should send
    ShouldRun,
}

impl Verdict {
    pub fn exit_code(self) -> i32 {
        match self {
            Verdict::AlreadySent => 0,
            Verdict::ShouldRun => 1,
        }
    }
}

/// Pick the main workflow: file name first, then "oil" + "daily" in the
/// name, then any name mentioning "oil"
pub fn pick_workflow(workflows: &[Workflow], files: &[String]) -> Option<u64> {
    let by_path = workflows.iter().find(|w| {
        let path = w.path.to_lowercase();
        files.iter().any(|f| path.ends_with(f.as_str()))
    });
    let by_name = || {
        workflows.iter().find(|w| {
            let name = w.name.to_lowercase();
            name.contains("oil") && name.contains("daily")
        })
    };
    let loose = || workflows.iter().find(|w| w.name.to_lowercase().contains("oil"));

    by_path.or_else(by_name).or_else(loose).map(|w| w.id)
}

/// Whether `run` succeeded on `today` in the clock's offset
pub fn is_success_on(run: &WorkflowRun, today: NaiveDate, clock: &BrtClock) -> bool {
    run.conclusion.as_deref() == Some("success")
        && run.created_at.is_some_and(|at| clock.date_of(at) == today)
}

pub struct Watchdog {
    client: GitHubClient,
    config: WatchdogConfig,
    clock: BrtClock,
}

impl Watchdog {
    pub fn new(config: WatchdogConfig) -> Result<Self> {
        let client = GitHubClient::new(config.repo.clone(), config.token.clone())?;
        Ok(Self::with_client(client, config))
    }

    pub fn with_client(client: GitHubClient, config: WatchdogConfig) -> Self {
        Self {
            client,
            config,
            clock: BrtClock::default(),
        }
    }

    async fn sentinel_sent_on(&self, today: NaiveDate) -> bool {
        match self.client.file_content(&self.config.sentinel_path).await {
            Ok(Some(content)) => match parse_last_sent(&content) {
                Some(day) if day == today => {
                    info!("Sentinel found with today's date: {}", day);
                    true
                }
                Some(day) => {
                    debug!("Sentinel present but not today: {}", day);
                    false
                }
                None => {
                    warn!("Failed to parse sentinel {}", self.config.sentinel_path);
                    false
                }
            },
            Ok(None) => {
                debug!("Sentinel {} not available", self.config.sentinel_path);
                false
            }
            Err(e) => {
                warn!("Sentinel check failed: {}", e);
                false
            }
        }
    }

    async fn find_workflow_id(&self) -> Option<u64> {
        match self.client.workflows().await {
            Ok(workflows) => {
                let id = pick_workflow(&workflows, &self.config.workflow_files);
                debug!("Main workflow id: {:?}", id);
                id
            }
            Err(e) => {
                warn!("Listing workflows failed: {}", e);
                None
            }
        }
    }

    async fn successful_run_on(&self, workflow_id: u64, today: NaiveDate) -> bool {
        for page in 1..=RUN_PAGES {
            let runs = match self.client.workflow_runs(workflow_id, page, RUNS_PER_PAGE).await {
                Ok(Some(runs)) => runs,
                Ok(None) => continue,
                Err(e) => {
                    warn!("Workflow runs check failed: {}", e);
                    return false;
                }
            };
            if runs.is_empty() {
                break;
            }
            if let Some(run) = runs.iter().find(|r| is_success_on(r, today, &self.clock)) {
                info!("Found successful workflow run today: run_id={}", run.id);
                return true;
            }
        }
        false
    }

    /// One pass over both checks; discovers the workflow id when still unknown
    async fn check(&self, workflow_id: &mut Option<u64>) -> bool {
        let today = self.clock.today();
        if self.sentinel_sent_on(today).await {
            return true;
        }

        if workflow_id.is_none() {
            *workflow_id = self.find_workflow_id().await;
        }
        match *workflow_id {
            Some(id) => self.successful_run_on(id, today).await,
            None => false,
        }
    }

    /// Check now, then poll every `interval` until `max_wait` has elapsed
    pub async fn run(&self) -> Verdict {
        info!(
            "Watchdog starting: repo={} max_wait={:?} interval={:?} sentinel_path={}",
            self.client.repo(),
            self.config.max_wait,
            self.config.interval,
            self.config.sentinel_path
        );

        let mut workflow_id = None;
        if self.check(&mut workflow_id).await {
            return Verdict::AlreadySent;
        }

        let started = Instant::now();
        while started.elapsed() < self.config.max_wait {
            debug!("Waiting and rechecking");
            sleep(self.config.interval).await;
            if self.check(&mut workflow_id).await {
                return Verdict::AlreadySent;
            }
        }

        info!("No successful run or sentinel found within timeout");
        Verdict::ShouldRun
    }
}
