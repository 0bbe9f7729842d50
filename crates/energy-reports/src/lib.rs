//! Energy market report jobs
//!
//! This crate holds everything the scheduled energy jobs need. It includes:
//!
//! - Series clients for FRED, EIA and Alpha Vantage behind the
//!   [`SeriesFetcher`] trait, with ordered per-series fallback ([`SourceChain`])
//! - CSV persistence of price and inventory series
//! - Metrics: day-over-day and week-over-week deltas, trends, z-score and
//!   linear forecast of weekly changes, five-year seasonal averages
//! - Fixed rule-based interpretations of inventory moves
//! - The commodity catalog and renderers for daily reports, inventory
//!   messages, the weekly summary and the dashboards
//! - Telegram delivery, the daily sentinel and report counters
//! - The main-job watchdog and the inventory smoke check
//!
//! # Example
//!
//! ```rust,ignore
//! use energy_reports::{Commodity, DailyJob, DailyOptions, DataSources, ReportConfig};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ReportConfig::from_env()?;
//!     let sources = DataSources::from_config(&config)?;
//!
//!     let job = DailyJob::new(config, sources)?
//!         .with_llm(energy_llm::FallbackChain::from_env(None).ok());
//!
//!     let outcome = job.run(&DailyOptions::new(Commodity::JetFuel)).await?;
//!     println!("{outcome:?}");
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod commodity;
pub mod config;
pub mod delivery;
pub mod error;
pub mod format;
pub mod guard;
pub mod interpret;
pub mod metrics;
pub mod pipeline;
pub mod prompts;
pub mod report;
pub mod retry;
pub mod series;
pub mod smoke;
pub mod source;
pub mod watchdog;

// Re-export main types for convenience
pub use commodity::{Commodity, CommodityProfile};
pub use config::ReportConfig;
pub use delivery::{ParseMode, TelegramClient, TelegramConfig};
pub use error::{ReportError, Result};
pub use guard::{BrtClock, Counter, Sentinel};
pub use metrics::{ChangeOutlook, PriceSummary, SeriesStats, Trend};
pub use pipeline::{DailyJob, DailyOptions, DailyOutcome, DailyReport, InventoryFiles};
pub use report::{LegSummary, ReportArtifact};
pub use series::{Observation, Series, SeriesSource};
pub use source::{DataSources, SeriesFetcher, SeriesRef, SourceChain};
pub use watchdog::{Verdict, Watchdog, WatchdogConfig};

// Re-export Language from energy-prompt
pub use energy_prompt::Language;
