//! `energy`: one subcommand per scheduled job
//!
//! Report text goes to stdout, logs to stderr. Settings come from the
//! environment (optionally a `.env` file); flags override them per run.

mod commands;

use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand};
use energy_llm::ProviderKind;
use energy_reports::Commodity;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "energy")]
#[command(version, about = "Scheduled energy market report jobs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Daily price report for one commodity, narrated by an LLM when available
    Daily(DailyArgs),
    /// Download a commodity's FRED price series into a CSV
    Fetch(FetchArgs),
    /// Fetch the weekly EIA inventory series into CSVs
    EiaFetch {
        /// Output directory (defaults to the data directory)
        #[arg(long)]
        out_dir: Option<PathBuf>,
    },
    /// Format the three inventory messages from the CSVs
    Inventory(InventoryArgs),
    /// Weekly macro summary from the inventory CSVs
    WeeklySummary {
        #[command(flatten)]
        inputs: InventoryInputs,
        /// Write the summary here as well as to stdout
        #[arg(long)]
        out: Option<PathBuf>,
        #[arg(long)]
        send_telegram: bool,
    },
    /// Markdown or HTML dashboard from the CSVs and a weekly summary
    Dashboard {
        #[command(flatten)]
        inputs: InventoryInputs,
        /// Weekly summary text file
        #[arg(long)]
        summary: PathBuf,
        #[arg(long)]
        out: PathBuf,
        /// Render the HTML dashboard instead of Markdown
        #[arg(long)]
        html: bool,
    },
    /// Check the inventory CSVs are non-empty and recent
    SmokeCheck {
        /// CSVs to check (defaults to the three inventory files)
        paths: Vec<PathBuf>,
    },
    /// Exit 0 when the main daily job already delivered today, 1 otherwise
    CheckMainRan,
}

#[derive(Args, Debug)]
#[allow(clippy::struct_excessive_bools)]
struct DailyArgs {
    commodity: Commodity,
    #[arg(long)]
    send_telegram: bool,
    /// Send to the test chat; the daily lock is not set
    #[arg(long)]
    preview: bool,
    /// Ignore the daily lock
    #[arg(long)]
    force: bool,
    #[arg(long)]
    counter_path: Option<PathBuf>,
    #[arg(long)]
    sent_path: Option<PathBuf>,
    /// Preferred LLM provider (piapi, groq, openai, deepseek)
    #[arg(long)]
    provider: Option<ProviderKind>,
    /// Series id, or a full `source:id,...` chain, for the first price leg
    #[arg(long)]
    series_id: Option<String>,
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Skip the LLM and send the plain report
    #[arg(long)]
    no_llm: bool,
    /// Write the JSON artifact here and attach it to the message
    #[arg(long)]
    artifact: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct FetchArgs {
    commodity: Commodity,
    #[arg(long)]
    out: Option<PathBuf>,
    #[arg(long)]
    series_id: Option<String>,
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Send the download summary (uranium) to Telegram
    #[arg(long)]
    send_telegram: bool,
}

/// Inventory CSV locations; any omitted file uses its standard name in the data directory
#[derive(Args, Debug, Default)]
struct InventoryInputs {
    #[arg(long)]
    crude: Option<PathBuf>,
    #[arg(long)]
    products: Option<PathBuf>,
    #[arg(long)]
    gas: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct InventoryArgs {
    #[command(flatten)]
    inputs: InventoryInputs,
    /// Directory for the three message files
    #[arg(long)]
    out_dir: Option<PathBuf>,
    /// Historical gas storage average (Bcf) for the gas reading
    #[arg(long)]
    hist_gas_avg: Option<f64>,
    #[arg(long)]
    dataset_link: Option<String>,
    #[arg(long)]
    send_telegram: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    energy_utils::load_dotenv();
    energy_utils::init_from_config(&energy_utils::Config::from_env());

    let cli = Cli::parse();
    commands::run(cli.command).await
}
