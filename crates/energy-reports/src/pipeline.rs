//! Job pipelines
//!
//! Each job is a straight fetch → transform → format → deliver run:
//!
//! - [`DailyJob`]: narrated (or plain) daily price report for one commodity,
//!   guarded by the daily sentinel and numbered by the counter file
//! - [`fetch_prices`]: FRED price download into a `date,price,source` CSV
//! - [`fetch_inventories`]: the three weekly EIA inventory series into CSVs
//! - [`inventory_messages`], [`weekly_snapshot`]: CSVs back into report input

use crate::commodity::Commodity;
use crate::config::ReportConfig;
use crate::delivery::{ParseMode, TelegramClient};
use crate::error::{ReportError, Result};
use crate::guard::{Counter, Sentinel};
use crate::metrics::{PriceSummary, SeriesStats, seasonal_average_for};
use crate::prompts;
use crate::report::daily::{PLAIN_PROVIDER, context_block, final_message, plain_report, report_title};
use crate::report::inventory::{Inventory, crude_message, gas_message, products_message};
use crate::report::weekly::WeeklySnapshot;
use crate::report::{LegSummary, ReportArtifact};
use crate::series::{Series, SeriesSource, read_series_csv, write_inventory_csv, write_price_csv};
use crate::source::{DataSources, SeriesRef};
use chrono::{NaiveDate, Utc};
use energy_llm::{FallbackChain, GenerationOptions};
use energy_prompt::{Language, PromptRegistry};
use energy_utils::env_opt;
use futures::future::try_join_all;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tracing::{info, instrument, warn};

/// Message printed when the sentinel says today's report is out
pub const ALREADY_SENT: &str = "Já foi enviado hoje (trava .sent). Use --force para ignorar.";

/// Per-run switches of a daily report
#[derive(Debug, Clone)]
#[allow(clippy::struct_excessive_bools)]
pub struct DailyOptions {
    pub commodity: Commodity,
    pub send_telegram: bool,
    /// Send to the test chat and leave the sentinel untouched
    pub preview: bool,
    /// Ignore the sentinel
    pub force: bool,
    pub counter_path: Option<PathBuf>,
    pub sent_path: Option<PathBuf>,
    /// Full chain (`fred:X,eia:Y`) or bare id for the first leg
    pub series_id: Option<String>,
    pub start: Option<NaiveDate>,
    pub no_llm: bool,
    /// Write the JSON artifact here and attach it when sending
    pub artifact: Option<PathBuf>,
}

impl DailyOptions {
    pub fn new(commodity: Commodity) -> Self {
        Self {
            commodity,
            send_telegram: false,
            preview: false,
            force: false,
            counter_path: None,
            sent_path: None,
            series_id: None,
            start: None,
            no_llm: false,
            artifact: None,
        }
    }
}

/// What a daily run produced
#[derive(Debug)]
pub enum DailyOutcome {
    /// Sentinel already set for today; nothing was fetched or sent
    AlreadySent,
    Built(DailyReport),
}

#[derive(Debug)]
pub struct DailyReport {
    /// Final Telegram HTML
    pub message: String,
    pub artifact: ReportArtifact,
    /// Whether the message reached a chat
    pub delivered: bool,
}

struct Narrative {
    body: String,
    provider: Option<String>,
    elapsed_secs: f64,
}

/// Daily report job for any catalog commodity
pub struct DailyJob {
    config: ReportConfig,
    sources: DataSources,
    llm: Option<FallbackChain>,
    telegram: Option<TelegramClient>,
    registry: PromptRegistry,
}

impl DailyJob {
    pub fn new(config: ReportConfig, sources: DataSources) -> Result<Self> {
        Ok(Self {
            config,
            sources,
            llm: None,
            telegram: None,
            registry: prompts::registry(Language::Portuguese)?,
        })
    }

    #[must_use]
    pub fn with_llm(mut self, llm: Option<FallbackChain>) -> Self {
        self.llm = llm;
        self
    }

    #[must_use]
    pub fn with_telegram(mut self, telegram: Option<TelegramClient>) -> Self {
        self.telegram = telegram;
        self
    }

    fn sentinel(&self, options: &DailyOptions) -> Sentinel {
        let path = options
            .sent_path
            .clone()
            .unwrap_or_else(|| self.config.sentinel_path(&options.commodity.sentinel_file()));
        Sentinel::new(path)
    }

    /// Run the whole report: guard, fetch, narrate, number, deliver
    #[instrument(skip(self, options), fields(commodity = %options.commodity))]
    pub async fn run(&self, options: &DailyOptions) -> Result<DailyOutcome> {
        let commodity = options.commodity;
        let profile = commodity.profile();
        let today = self.config.clock().today();

        let sentinel = self.sentinel(options);
        if !options.force && sentinel.is_sent_on(today) {
            info!("{} already sent on {}", commodity, today);
            return Ok(DailyOutcome::AlreadySent);
        }

        let legs = self.fetch_legs(options).await?;
        let threshold = self.config.trend_threshold;
        let context = context_block(profile, &legs, threshold);
        let narrative = self.narrate(options, &legs, &context).await?;

        let counter_path = options
            .counter_path
            .clone()
            .unwrap_or_else(|| self.config.counter_path.clone());
        let number = Counter::new(counter_path).next(commodity.counter_key())?;
        let title = report_title(commodity, today, number);

        let provider = narrative.provider.as_deref().unwrap_or(PLAIN_PROVIDER);
        let message = final_message(&title, &narrative.body, provider, narrative.elapsed_secs);

        let artifact = ReportArtifact {
            commodity,
            title,
            generated_at: Utc::now(),
            stats: legs,
            provider: narrative.provider,
            elapsed_secs: Some(narrative.elapsed_secs),
            text: narrative.body,
        };
        if let Some(path) = &options.artifact {
            artifact.write(path)?;
            info!("Artifact written to {}", path.display());
        }

        let delivered = if options.send_telegram {
            self.deliver(&message, &artifact, options).await?
        } else {
            false
        };

        // only a real send to the main chat closes the day
        if delivered && !options.preview {
            sentinel.mark_sent(today)?;
        }

        Ok(DailyOutcome::Built(DailyReport {
            message,
            artifact,
            delivered,
        }))
    }

    /// Price summary of every leg, fetched concurrently
    async fn fetch_legs(&self, options: &DailyOptions) -> Result<Vec<LegSummary>> {
        let commodity = options.commodity;
        let series_override = options
            .series_id
            .clone()
            .or_else(|| commodity.profile().daily_env_override.and_then(env_opt));
        let start = options.start.or_else(|| commodity.daily_start());

        let chains = commodity.price_chains(series_override.as_deref())?;
        let fetches = chains.iter().map(|(name, chain)| async move {
            let series = chain.fetch(&self.sources, start).await?;
            let summary = PriceSummary::from_series(&series).ok_or_else(|| {
                ReportError::unavailable(chain.name(), "no numeric observations")
            })?;
            Ok::<_, ReportError>(LegSummary::new(*name, summary))
        });

        try_join_all(fetches).await
    }

    async fn narrate(&self, options: &DailyOptions, legs: &[LegSummary], context: &str) -> Result<Narrative> {
        let profile = options.commodity.profile();
        let plain = || {
            let started = Instant::now();
            let body = plain_report(profile, legs, self.config.trend_threshold);
            Narrative {
                body,
                provider: None,
                elapsed_secs: started.elapsed().as_secs_f64(),
            }
        };

        if options.no_llm {
            return Ok(plain());
        }
        let Some(llm) = &self.llm else {
            warn!("No LLM provider configured, using the plain report");
            return Ok(plain());
        };

        let (system, user) = prompts::render_daily(&self.registry, profile, context)?;
        let generation_options = GenerationOptions::new(profile.temperature, profile.max_tokens);

        match llm.generate(&system, &user, &generation_options).await {
            Ok(generation) => Ok(Narrative {
                body: generation.text,
                provider: Some(generation.provider),
                elapsed_secs: generation.elapsed.as_secs_f64(),
            }),
            Err(e) => {
                warn!(error = %e, "LLM narration failed, using the plain report");
                Ok(plain())
            }
        }
    }

    async fn deliver(&self, message: &str, artifact: &ReportArtifact, options: &DailyOptions) -> Result<bool> {
        let Some(telegram) = &self.telegram else {
            warn!("Telegram not configured, skipping send");
            return Ok(false);
        };

        telegram.send_message(message, ParseMode::Html).await?;
        if options.artifact.is_some() {
            telegram
                .send_document(&artifact.file_name(), artifact.to_json()?.into_bytes(), Some(&artifact.title))
                .await?;
        }
        Ok(true)
    }
}

/// Where a price download lands and what it held
#[derive(Debug)]
pub struct PriceDownload {
    pub path: PathBuf,
    pub series: Series,
    pub rows: usize,
}

/// Default CSV for a commodity's price download, e.g. `jet_fuel_price.csv`
pub fn price_csv_path(config: &ReportConfig, commodity: Commodity) -> PathBuf {
    config.data_path(&format!("{}_price.csv", commodity.slug().replace('-', "_")))
}

/// Download a commodity's FRED series into a price CSV
///
/// `series_id` falls back to the profile's environment override, then to
/// its default id; `start` to the profile's first year.
#[instrument(skip(sources, config))]
pub async fn fetch_prices(
    sources: &DataSources,
    config: &ReportConfig,
    commodity: Commodity,
    series_id: Option<&str>,
    start: Option<NaiveDate>,
    out: Option<&Path>,
) -> Result<PriceDownload> {
    let fetch = commodity.profile().fetch;
    let series_id = series_id.map_or_else(|| commodity.fetch_series_id(env_opt), str::to_string);
    let start = start.or_else(|| commodity.fetch_start());
    let path = out.map_or_else(|| price_csv_path(config, commodity), Path::to_path_buf);

    let fred = sources.get(SeriesSource::Fred).ok_or_else(|| {
        ReportError::ConfigError(format!("{} not set", SeriesSource::Fred.api_key_var()))
    })?;
    let series = fred
        .fetch_at(&series_id, start, fetch.frequency.map(str::to_string))
        .await?;
    let rows = write_price_csv(&series, &path)?;

    let tag = commodity.slug().replace('-', "_").to_uppercase();
    info!("[{}/FRED] CSV salvo em {}", tag, path.display());
    if let (Some((first, _)), Some((last, _))) = (series.valued().next(), series.valued().last()) {
        info!("[{}/FRED] Linhas: {} — Período {} → {}", tag, rows, first, last);
    }

    Ok(PriceDownload { path, series, rows })
}

/// Locations of the three weekly inventory CSVs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryFiles {
    pub crude: PathBuf,
    pub products: PathBuf,
    pub gas: PathBuf,
}

impl InventoryFiles {
    /// Standard file names inside `dir`
    pub fn in_dir(dir: &Path) -> Self {
        Self {
            crude: dir.join(Inventory::Crude.csv_file()),
            products: dir.join(Inventory::Products.csv_file()),
            gas: dir.join(Inventory::GasStorage.csv_file()),
        }
    }

    pub fn path(&self, inventory: Inventory) -> &Path {
        match inventory {
            Inventory::Crude => &self.crude,
            Inventory::Products => &self.products,
            Inventory::GasStorage => &self.gas,
        }
    }

    pub fn all(&self) -> [&Path; 3] {
        [&self.crude, &self.products, &self.gas]
    }
}

/// Fetch the three EIA inventory series concurrently and write their CSVs
///
/// Series ids come from `lookup` (the `EIA_*_SERIES_ID` variables) with the
/// usual defaults. Any failed fetch fails the job.
#[instrument(skip(sources, lookup))]
pub async fn fetch_inventories<F>(sources: &DataSources, files: &InventoryFiles, lookup: F) -> Result<Vec<Series>>
where
    F: Fn(&str) -> Option<String>,
{
    let fetches = Inventory::ALL.into_iter().map(|inventory| {
        let series_ref = SeriesRef::eia(inventory.series_id(&lookup));
        async move {
            let series = sources.fetch(&series_ref, None).await?;
            let path = files.path(inventory);
            write_inventory_csv(&series, inventory.column(), path)?;
            info!("Wrote {}", path.display());
            Ok::<_, ReportError>(series)
        }
    });

    try_join_all(fetches).await
}

fn latest_from_csv(path: &Path) -> Result<(Series, Option<SeriesStats>)> {
    let series = read_series_csv(path)?;
    let stats = SeriesStats::latest(&series);
    Ok((series, stats))
}

/// The three Telegram inventory messages
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryMessages {
    pub crude: String,
    pub products: String,
    pub gas: String,
}

impl InventoryMessages {
    /// Write the messages under `dir` with their standard names
    pub fn write(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        [
            (Inventory::Crude, &self.crude),
            (Inventory::Products, &self.products),
            (Inventory::GasStorage, &self.gas),
        ]
        .into_iter()
        .map(|(inventory, text)| {
            let path = dir.join(inventory.message_file());
            write_text(&path, text)?;
            Ok(path)
        })
        .collect()
    }
}

/// Format the inventory messages from the CSVs
///
/// Without `hist_gas_avg` the gas reading is compared with the five-year
/// average of its ISO week, when the CSV has enough history.
pub fn inventory_messages(
    files: &InventoryFiles,
    hist_gas_avg: Option<f64>,
    dataset_link: Option<&str>,
) -> Result<InventoryMessages> {
    let (_, crude) = latest_from_csv(&files.crude)?;
    let (_, products) = latest_from_csv(&files.products)?;
    let (gas_series, gas) = latest_from_csv(&files.gas)?;

    let hist_avg = hist_gas_avg.or_else(|| {
        gas.as_ref()
            .and_then(|stats| seasonal_average_for(&gas_series, stats.date))
    });

    Ok(InventoryMessages {
        crude: crude_message(crude.as_ref(), dataset_link),
        products: products_message(products.as_ref(), dataset_link),
        gas: gas_message(gas.as_ref(), hist_avg, dataset_link),
    })
}

/// Weekly readings and outlooks from the inventory CSVs
pub fn weekly_snapshot(files: &InventoryFiles) -> Result<WeeklySnapshot> {
    let crude = read_series_csv(&files.crude)?;
    let products = read_series_csv(&files.products)?;
    let gas = read_series_csv(&files.gas)?;
    Ok(WeeklySnapshot::from_series(Some(&crude), Some(&products), Some(&gas)))
}

/// Write `text` to `path`, creating parent directories
pub fn write_text(path: &Path, text: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, text)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::delivery::TelegramConfig;
    use crate::series::Observation;
    use crate::source::MockSeriesFetcher;
    use async_trait::async_trait;
    use energy_llm::{
        CompletionRequest, CompletionResponse, LLMError, LLMProvider, Message, StopReason, TokenUsage,
    };
    use mockall::predicate::eq;
    use std::sync::Arc;
    use tempfile::TempDir;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn prices(id: &str, values: &[(NaiveDate, f64)]) -> Series {
        Series::new(
            id,
            id,
            SeriesSource::Fred,
            values.iter().map(|(d, v)| Observation::new(*d, Some(*v))).collect(),
        )
    }

    fn config(dir: &TempDir) -> ReportConfig {
        ReportConfig::builder().data_dir(dir.path()).build().unwrap()
    }

    fn fred_returning(series: Series) -> DataSources {
        let mut fred = MockSeriesFetcher::new();
        fred.expect_source().return_const(SeriesSource::Fred);
        fred.expect_fetch().returning(move |_, _| Ok(series.clone()));
        DataSources::new().with(Arc::new(fred))
    }

    fn jet_fuel_series() -> Series {
        prices("DJFUELUSGULF", &[(date(2025, 3, 3), 2.10), (date(2025, 3, 4), 2.205)])
    }

    struct FixedProvider(Option<&'static str>);

    #[async_trait]
    impl LLMProvider for FixedProvider {
        async fn complete(&self, request: CompletionRequest) -> energy_llm::Result<CompletionResponse> {
            match self.0 {
                Some(text) => Ok(CompletionResponse {
                    message: Message::assistant(text),
                    model: request.model,
                    stop_reason: StopReason::EndTurn,
                    usage: TokenUsage::default(),
                }),
                None => Err(LLMError::RequestFailed("down".to_string())),
            }
        }

        fn name(&self) -> &str {
            "groq"
        }

        fn default_model(&self) -> &str {
            "test-model"
        }
    }

    fn telegram_for(server: &MockServer) -> TelegramClient {
        let config = TelegramConfig {
            bot_token: "tok".to_string(),
            chat_id: "-100".to_string(),
            message_thread_id: None,
            base_url: server.uri(),
        };
        TelegramClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn test_daily_plain_report_without_llm() {
        let dir = TempDir::new().unwrap();
        let job = DailyJob::new(config(&dir), fred_returning(jet_fuel_series())).unwrap();

        let mut options = DailyOptions::new(Commodity::JetFuel);
        options.series_id = Some("fred:DJFUELUSGULF".to_string());

        let DailyOutcome::Built(report) = job.run(&options).await.unwrap() else {
            panic!("expected a report");
        };
        assert!(report.message.contains("— Nº 1</b>"));
        assert!(report.message.contains(&format!("Provedor LLM: {PLAIN_PROVIDER}")));
        assert!(!report.delivered);
        assert_eq!(report.artifact.provider, None);
        assert_eq!(report.artifact.stats[0].summary.latest, (date(2025, 3, 4), 2.205));

        // the counter advances, the sentinel stays unset
        let DailyOutcome::Built(second) = job.run(&options).await.unwrap() else {
            panic!("expected a report");
        };
        assert!(second.message.contains("— Nº 2</b>"));
        assert!(!dir.path().join("sentinels/jet_fuel_daily.sent").exists());
    }

    #[tokio::test]
    async fn test_daily_uses_llm_text_and_provider() {
        let dir = TempDir::new().unwrap();
        let chain = FallbackChain::new(vec![Arc::new(FixedProvider(Some("**1) Preço**\nEm alta.")))]);
        let job = DailyJob::new(config(&dir), fred_returning(jet_fuel_series()))
            .unwrap()
            .with_llm(Some(chain));

        let artifact_path = dir.path().join("out/report.json");
        let mut options = DailyOptions::new(Commodity::JetFuel);
        options.series_id = Some("fred:DJFUELUSGULF".to_string());
        options.artifact = Some(artifact_path.clone());

        let DailyOutcome::Built(report) = job.run(&options).await.unwrap() else {
            panic!("expected a report");
        };
        assert!(report.message.contains("<b>1) Preço</b>\nEm alta."));
        assert!(report.message.contains("<i>Provedor LLM: groq • "));

        let saved = ReportArtifact::read(&artifact_path).unwrap();
        assert_eq!(saved.provider.as_deref(), Some("groq"));
        assert_eq!(saved.text, "**1) Preço**\nEm alta.");
    }

    #[tokio::test]
    async fn test_daily_falls_back_to_plain_when_llm_fails() {
        let dir = TempDir::new().unwrap();
        let chain = FallbackChain::new(vec![Arc::new(FixedProvider(None))]);
        let job = DailyJob::new(config(&dir), fred_returning(jet_fuel_series()))
            .unwrap()
            .with_llm(Some(chain));

        let mut options = DailyOptions::new(Commodity::JetFuel);
        options.series_id = Some("fred:DJFUELUSGULF".to_string());

        let DailyOutcome::Built(report) = job.run(&options).await.unwrap() else {
            panic!("expected a report");
        };
        assert!(report.artifact.text.starts_with("**1) "));
        assert_eq!(report.artifact.provider, None);
    }

    #[tokio::test]
    async fn test_daily_send_marks_sentinel_once() {
        let dir = TempDir::new().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottok/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(1)
            .mount(&server)
            .await;

        let job = DailyJob::new(config(&dir), fred_returning(jet_fuel_series()))
            .unwrap()
            .with_telegram(Some(telegram_for(&server)));

        let mut options = DailyOptions::new(Commodity::JetFuel);
        options.series_id = Some("fred:DJFUELUSGULF".to_string());
        options.send_telegram = true;

        let DailyOutcome::Built(report) = job.run(&options).await.unwrap() else {
            panic!("expected a report");
        };
        assert!(report.delivered);

        let sentinel = Sentinel::new(dir.path().join("sentinels/jet_fuel_daily.sent"));
        assert!(sentinel.is_sent_on(ReportConfig::default().clock().today()));

        assert!(matches!(job.run(&options).await.unwrap(), DailyOutcome::AlreadySent));
    }

    #[tokio::test]
    async fn test_daily_preview_leaves_sentinel_alone() {
        let dir = TempDir::new().unwrap();
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/bottok/sendMessage"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"ok": true})))
            .expect(2)
            .mount(&server)
            .await;

        let job = DailyJob::new(config(&dir), fred_returning(jet_fuel_series()))
            .unwrap()
            .with_telegram(Some(telegram_for(&server)));

        let mut options = DailyOptions::new(Commodity::JetFuel);
        options.series_id = Some("fred:DJFUELUSGULF".to_string());
        options.send_telegram = true;
        options.preview = true;

        for _ in 0..2 {
            assert!(matches!(job.run(&options).await.unwrap(), DailyOutcome::Built(_)));
        }
        assert!(!dir.path().join("sentinels/jet_fuel_daily.sent").exists());
    }

    #[tokio::test]
    async fn test_daily_fetch_failure_is_an_error() {
        let dir = TempDir::new().unwrap();
        let job = DailyJob::new(config(&dir), DataSources::new()).unwrap();

        let mut options = DailyOptions::new(Commodity::Coal);
        options.series_id = Some("fred:PCOALAUUSDM".to_string());

        let err = job.run(&options).await.unwrap_err();
        assert!(matches!(err, ReportError::AllSourcesFailed { .. }));
        assert_eq!(Counter::new(dir.path().join("counters.json")).current("diario_carvao"), 0);
    }

    #[tokio::test]
    async fn test_fetch_prices_writes_csv_with_frequency() {
        let dir = TempDir::new().unwrap();
        let series = prices("DRGASLA", &[(date(2025, 3, 3), 2.41), (date(2025, 3, 4), 2.45)]);

        let mut fred = MockSeriesFetcher::new();
        fred.expect_source().return_const(SeriesSource::Fred);
        fred.expect_fetch_at().times(1).returning(move |id, start, frequency| {
            assert_eq!(id, "DRGASLA");
            assert_eq!(start, NaiveDate::from_ymd_opt(2003, 1, 1));
            assert_eq!(frequency.as_deref(), Some("d"));
            Ok(series.clone())
        });
        let sources = DataSources::new().with(Arc::new(fred));

        let download = fetch_prices(&sources, &config(&dir), Commodity::Rbob, Some("DRGASLA"), None, None)
            .await
            .unwrap();
        assert_eq!(download.rows, 2);
        assert_eq!(download.path, dir.path().join("rbob_price.csv"));

        let content = fs::read_to_string(&download.path).unwrap();
        assert_eq!(content, "date,price,source\n2025-03-03,2.41,FRED:DRGASLA\n2025-03-04,2.45,FRED:DRGASLA\n");
    }

    #[tokio::test]
    async fn test_fetch_prices_requires_fred() {
        let dir = TempDir::new().unwrap();
        let err = fetch_prices(&DataSources::new(), &config(&dir), Commodity::Uranium, None, None, None)
            .await
            .unwrap_err();
        assert!(matches!(err, ReportError::ConfigError(ref m) if m.contains("FRED_API_KEY")));
    }

    fn weekly(id: &str, values: &[f64]) -> Series {
        let start = date(2025, 1, 3);
        let observations = values
            .iter()
            .enumerate()
            .map(|(i, v)| Observation::new(start + chrono::Duration::weeks(i64::try_from(i).unwrap()), Some(*v)))
            .collect();
        Series::new(id, format!("{id} label"), SeriesSource::Eia, observations)
    }

    #[tokio::test]
    async fn test_inventory_round_trip_through_csv() {
        let dir = TempDir::new().unwrap();
        let mut eia = MockSeriesFetcher::new();
        eia.expect_source().return_const(SeriesSource::Eia);
        eia.expect_fetch()
            .with(eq("PET.WCESTUS1.W"), eq(None))
            .returning(|id, _| Ok(weekly(id, &[430_000.0, 433_600.0])));
        eia.expect_fetch()
            .with(eq("CUSTOM.PRODUCTS"), eq(None))
            .returning(|id, _| Ok(weekly(id, &[1_600_000.0, 1_590_000.0])));
        eia.expect_fetch()
            .with(eq("NG.NW2_EPG0_SWO_R48_BCF.W"), eq(None))
            .returning(|id, _| Ok(weekly(id, &[1800.0, 1760.5])));
        let sources = DataSources::new().with(Arc::new(eia));

        let files = InventoryFiles::in_dir(dir.path());
        let lookup = |var: &str| (var == "EIA_PETROLEUM_PRODUCTS_SERIES_ID").then(|| "CUSTOM.PRODUCTS".to_string());
        let fetched = fetch_inventories(&sources, &files, lookup).await.unwrap();
        assert_eq!(fetched.len(), 3);

        let gas_csv = fs::read_to_string(&files.gas).unwrap();
        assert!(gas_csv.starts_with("date,storage_bcf,series_id,label,retrieved_at\n"));

        let messages = inventory_messages(&files, Some(1900.0), None).unwrap();
        assert!(messages.crude.contains("📈 *Estoque:* 433,600 bbl"));
        assert!(messages.products.contains("🔖 *Série:* CUSTOM.PRODUCTS label (CUSTOM.PRODUCTS)"));
        assert!(messages.gas.contains("📦 *Storage Total:* 1,760.5 Bcf"));

        let written = messages.write(&dir.path().join("messages")).unwrap();
        assert_eq!(written[2], dir.path().join("messages/telegram_gas_storage.txt"));
        assert_eq!(fs::read_to_string(&written[0]).unwrap(), messages.crude);

        let snapshot = weekly_snapshot(&files).unwrap();
        assert_eq!(snapshot.reference_date(), Some(date(2025, 1, 10)));
    }

    #[test]
    fn test_inventory_messages_with_empty_csvs() {
        let dir = TempDir::new().unwrap();
        let files = InventoryFiles::in_dir(dir.path());
        for path in files.all() {
            fs::write(path, "date,value,series_id,label,retrieved_at\n").unwrap();
        }

        let messages = inventory_messages(&files, None, None).unwrap();
        assert!(messages.crude.ends_with("Sem dados disponíveis."));
        assert!(messages.gas.ends_with("Sem dados disponíveis."));
    }
}
