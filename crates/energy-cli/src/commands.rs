//! Subcommand handlers

use crate::{Commands, DailyArgs, FetchArgs, InventoryArgs, InventoryInputs};
use anyhow::{Context, Result};
use chrono::Utc;
use energy_llm::FallbackChain;
use energy_reports::delivery::{ParseMode, TelegramClient, TelegramConfig};
use energy_reports::pipeline::{
    self, ALREADY_SENT, DailyJob, DailyOptions, DailyOutcome, InventoryFiles,
};
use energy_reports::report::daily::uranium_summary;
use energy_reports::report::{dashboard, weekly};
use energy_reports::{Commodity, DataSources, ReportConfig, Verdict, Watchdog, WatchdogConfig, smoke};
use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::{info, warn};

/// Environment variable lookup
type Env<'a> = &'a (dyn Fn(&str) -> Option<String> + Sync);

pub async fn run(command: Commands) -> Result<ExitCode> {
    run_with(command, &|key: &str| std::env::var(key).ok()).await
}

/// Dispatch `command`; only the jobs that use `ReportConfig` load it
async fn run_with(command: Commands, env: Env<'_>) -> Result<ExitCode> {
    let config = || ReportConfig::from_lookup(env).context("invalid report configuration");

    match command {
        Commands::Daily(args) => daily(config()?, args).await,
        Commands::Fetch(args) => fetch(&config()?, args).await,
        Commands::EiaFetch { out_dir } => eia_fetch(&config()?, out_dir).await,
        Commands::Inventory(args) => inventory(&config()?, args).await,
        Commands::WeeklySummary {
            inputs,
            out,
            send_telegram,
        } => weekly_summary(&config()?, &inputs, out, send_telegram).await,
        Commands::Dashboard {
            inputs,
            summary,
            out,
            html,
        } => build_dashboard(&config()?, &inputs, &summary, &out, html),
        Commands::SmokeCheck { paths } => Ok(smoke_check(env, paths)),
        Commands::CheckMainRan => check_main_ran(WatchdogConfig::from_lookup(env)).await,
    }
}

fn telegram(preview: bool) -> Result<Option<TelegramClient>> {
    let Some(config) = TelegramConfig::from_env(preview) else {
        warn!("Telegram not configured (TELEGRAM_BOT_TOKEN / TELEGRAM_CHAT_ID_ENERGY)");
        return Ok(None);
    };
    Ok(Some(TelegramClient::new(config).context("failed to build the Telegram client")?))
}

async fn send(text: &str, mode: ParseMode) -> Result<()> {
    if let Some(client) = telegram(false)? {
        client.send_message(text, mode).await.context("Telegram send failed")?;
    }
    Ok(())
}

fn inventory_files(config: &ReportConfig, inputs: &InventoryInputs) -> InventoryFiles {
    let defaults = InventoryFiles::in_dir(&config.data_dir);
    InventoryFiles {
        crude: inputs.crude.clone().unwrap_or(defaults.crude),
        products: inputs.products.clone().unwrap_or(defaults.products),
        gas: inputs.gas.clone().unwrap_or(defaults.gas),
    }
}

async fn daily(config: ReportConfig, args: DailyArgs) -> Result<ExitCode> {
    let llm = if args.no_llm {
        None
    } else {
        match FallbackChain::from_env(args.provider) {
            Ok(chain) => {
                info!("LLM providers: {}", chain.provider_names().join(" → "));
                Some(chain)
            }
            Err(e) => {
                warn!("No usable LLM provider: {}", e);
                None
            }
        }
    };
    let telegram = if args.send_telegram { telegram(args.preview)? } else { None };

    let sources = DataSources::from_config(&config).context("failed to build the data API clients")?;
    let job = DailyJob::new(config, sources)?.with_llm(llm).with_telegram(telegram);

    let options = DailyOptions {
        commodity: args.commodity,
        send_telegram: args.send_telegram,
        preview: args.preview,
        force: args.force,
        counter_path: args.counter_path,
        sent_path: args.sent_path,
        series_id: args.series_id,
        start: args.start,
        no_llm: args.no_llm,
        artifact: args.artifact,
    };

    match job
        .run(&options)
        .await
        .with_context(|| format!("{} daily report failed", args.commodity))?
    {
        DailyOutcome::AlreadySent => println!("{ALREADY_SENT}"),
        DailyOutcome::Built(report) => println!("{}", report.message),
    }
    Ok(ExitCode::SUCCESS)
}

async fn fetch(config: &ReportConfig, args: FetchArgs) -> Result<ExitCode> {
    let sources = DataSources::from_config(config).context("failed to build the data API clients")?;
    let download = pipeline::fetch_prices(
        &sources,
        config,
        args.commodity,
        args.series_id.as_deref(),
        args.start,
        args.out.as_deref(),
    )
    .await
    .with_context(|| format!("{} price download failed", args.commodity))?;

    if args.commodity == Commodity::Uranium {
        if let Some(summary) = uranium_summary(&download.series) {
            println!("{summary}");
            if args.send_telegram {
                send(&summary, ParseMode::Markdown).await?;
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn eia_fetch(config: &ReportConfig, out_dir: Option<PathBuf>) -> Result<ExitCode> {
    let dir = out_dir.unwrap_or_else(|| config.data_dir.clone());
    let files = InventoryFiles::in_dir(&dir);
    let sources = DataSources::from_config(config).context("failed to build the data API clients")?;

    pipeline::fetch_inventories(&sources, &files, energy_utils::env_opt)
        .await
        .context("EIA inventory fetch failed")?;
    Ok(ExitCode::SUCCESS)
}

async fn inventory(config: &ReportConfig, args: InventoryArgs) -> Result<ExitCode> {
    let files = inventory_files(config, &args.inputs);
    let messages = pipeline::inventory_messages(&files, args.hist_gas_avg, args.dataset_link.as_deref())
        .context("failed to format the inventory messages")?;

    let out_dir = args.out_dir.unwrap_or_else(|| config.data_dir.clone());
    let written = messages.write(&out_dir)?;
    for path in &written {
        info!("Wrote {}", path.display());
    }

    for text in [&messages.crude, &messages.products, &messages.gas] {
        println!("{text}");
        if args.send_telegram {
            send(text, ParseMode::Markdown).await?;
        }
    }
    Ok(ExitCode::SUCCESS)
}

async fn weekly_summary(
    config: &ReportConfig,
    inputs: &InventoryInputs,
    out: Option<PathBuf>,
    send_telegram: bool,
) -> Result<ExitCode> {
    let files = inventory_files(config, inputs);
    let snapshot = pipeline::weekly_snapshot(&files).context("failed to read the inventory CSVs")?;
    let summary = weekly::summary_message(&snapshot);

    if let Some(path) = out {
        pipeline::write_text(&path, &summary)?;
        info!("Wrote {}", path.display());
    }
    println!("{summary}");
    if send_telegram {
        send(&summary, ParseMode::Markdown).await?;
    }
    Ok(ExitCode::SUCCESS)
}

fn build_dashboard(
    config: &ReportConfig,
    inputs: &InventoryInputs,
    summary: &std::path::Path,
    out: &std::path::Path,
    html: bool,
) -> Result<ExitCode> {
    let files = inventory_files(config, inputs);
    let snapshot = pipeline::weekly_snapshot(&files).context("failed to read the inventory CSVs")?;
    let summary = fs::read_to_string(summary)
        .with_context(|| format!("failed to read {}", summary.display()))?;

    let page = if html {
        dashboard::html_dashboard(&snapshot, &summary)
    } else {
        dashboard::markdown_dashboard(&snapshot, &summary)
    };
    pipeline::write_text(out, &page)?;
    info!("Wrote {}", out.display());
    Ok(ExitCode::SUCCESS)
}

fn smoke_failed(error: &dyn std::fmt::Display) -> ExitCode {
    println!("SMOKE FAILED: {error}");
    ExitCode::from(2)
}

fn smoke_check(env: Env<'_>, paths: Vec<PathBuf>) -> ExitCode {
    let paths = if paths.is_empty() {
        match ReportConfig::from_lookup(env) {
            Ok(config) => InventoryFiles::in_dir(&config.data_dir)
                .all()
                .map(std::path::Path::to_path_buf)
                .to_vec(),
            Err(e) => return smoke_failed(&e),
        }
    } else {
        paths
    };

    match smoke::run(paths.as_slice(), Utc::now()) {
        Ok(()) => {
            println!("SMOKE OK");
            ExitCode::SUCCESS
        }
        Err(e) => smoke_failed(&e),
    }
}

async fn check_main_ran(config: Option<WatchdogConfig>) -> Result<ExitCode> {
    let Some(config) = config else {
        // without credentials the backup stays quiet
        warn!("GITHUB_REPOSITORY or GITHUB_TOKEN not set, skipping watchdog");
        return Ok(ExitCode::SUCCESS);
    };

    let verdict = Watchdog::new(config)?.run().await;
    match verdict {
        Verdict::AlreadySent => info!("Main job already delivered today"),
        Verdict::ShouldRun => info!("Main job did not deliver, watchdog should run"),
    }
    Ok(ExitCode::from(u8::try_from(verdict.exit_code()).unwrap_or(1)))
}
