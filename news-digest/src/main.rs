use anyhow::{bail, Context, Result};
use chrono::Utc;
use clap::{Args, Parser, Subcommand};
use news_digest::aggregator::{categories, summarize, ReportFilter};
use news_digest::config::DEFAULT_CONFIG_FILE;
use news_digest::digest::{
    export_csv, export_file_name, export_rows, spotlight, SpotlightItem, SPOTLIGHT_SIZE,
};
use news_digest::pipeline::generate_overview;
use news_digest::{
    AnnotatedRecord, DigestConfig, DigestPipeline, FieldExtractor, OpenAiAdapter, RecordStore,
    Relevance, ReportSummary, SqliteStore, TimeBucket, TimeBucketAggregator,
};
use serde::Serialize;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info, warn};

#[derive(Parser, Debug)]
#[command(
    author,
    version,
    about = "Climate news digest: fetch, annotate and report",
    long_about = None
)]
struct Cli {
    /// Path to the TOML config file
    #[arg(short, long, global = true, default_value = DEFAULT_CONFIG_FILE)]
    config: PathBuf,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Fetch all feeds, annotate new articles and store them
    Run,
    /// Print totals, top mentions, top themes and the spotlight for one month
    Report {
        #[command(flatten)]
        selection: Selection,
        /// Also ask the annotator for a five-point overview
        #[arg(long)]
        overview: bool,
        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },
    /// Write the selected records to a CSV file
    Export {
        #[command(flatten)]
        selection: Selection,
        /// Output path, defaults to "<month>_summaries.csv"
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// List the months that have records, newest first
    Buckets,
}

#[derive(Args, Debug)]
struct Selection {
    /// Month to report on, e.g. "October 2026". Defaults to the newest month.
    #[arg(short, long)]
    month: Option<String>,
    /// Category to include (repeatable). Defaults to every category in the month.
    #[arg(long = "category")]
    categories: Vec<String>,
    /// Relevance tier to include (repeatable). Defaults to High and Medium.
    #[arg(short, long = "relevance")]
    relevance: Vec<String>,
}

#[derive(Serialize)]
struct Report<'a> {
    month: String,
    summary: ReportSummary,
    spotlight: Vec<SpotlightItem>,
    overview: Option<&'a str>,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { tracing::Level::DEBUG } else { tracing::Level::INFO };
    tracing_subscriber::fmt().with_max_level(level).with_writer(std::io::stderr).init();

    let config = DigestConfig::load(&cli.config)
        .with_context(|| format!("failed to load config from {}", cli.config.display()))?;

    let database_url = config.store.resolved_url();
    let store = SqliteStore::connect(&database_url)
        .await
        .map_err(|e| {
            error!("Could not open record store at {}", database_url);
            e
        })
        .context("failed to open record store")?;
    let store: Arc<dyn RecordStore> = Arc::new(store);

    match cli.command {
        Commands::Run => run_batch(&config, store).await,
        Commands::Report { selection, overview, json } => {
            report(&config, store, &selection, overview, json).await
        }
        Commands::Export { selection, output } => export(&config, store, &selection, output).await,
        Commands::Buckets => buckets(&config, store).await,
    }
}

async fn run_batch(config: &DigestConfig, store: Arc<dyn RecordStore>) -> Result<()> {
    if config.feed_count() == 0 {
        bail!("no feeds configured; add [[feeds]] tables to the config file");
    }
    let annotator = Arc::new(
        OpenAiAdapter::from_config(&config.annotator).context("annotator setup failed")?,
    );
    let pipeline = DigestPipeline::from_config(config, annotator, store)?;

    info!("Running batch over {} feeds", config.feed_count());
    let report = pipeline.run_batch().await.context("batch aborted")?;

    println!(
        "fetched {}, skipped {} already known, annotated {}, failed {}",
        report.fetched, report.skipped_existing, report.annotated, report.failed
    );
    Ok(())
}

/// Field extractor for one command, with "now" fixed at call time.
fn field_extractor(config: &DigestConfig) -> FieldExtractor {
    FieldExtractor::new(config.pipeline.time_bucket_policy, Utc::now())
}

/// Month, then category and tier filters. Returns the chosen month and the kept records.
async fn select(
    extractor: &FieldExtractor,
    store: &Arc<dyn RecordStore>,
    selection: &Selection,
) -> Result<Option<(TimeBucket, Vec<AnnotatedRecord>)>> {
    let records = store.load_all().await.context("failed to load records")?;
    let aggregator = TimeBucketAggregator::new(*extractor);

    let bucket = match &selection.month {
        Some(month) => month.parse::<TimeBucket>().map_err(anyhow::Error::msg)?,
        None => match aggregator.latest_bucket(&records) {
            Some(bucket) => bucket,
            None => return Ok(None),
        },
    };
    let month_records = aggregator.in_bucket(&records, bucket);

    let tiers: Vec<Relevance> = if selection.relevance.is_empty() {
        ReportFilter::default_tiers().to_vec()
    } else {
        selection
            .relevance
            .iter()
            .map(|tier| tier.parse::<Relevance>())
            .collect::<std::result::Result<Vec<Relevance>, String>>()
            .map_err(anyhow::Error::msg)?
    };
    let chosen = if selection.categories.is_empty() {
        categories(&month_records)
    } else {
        selection.categories.clone()
    };

    let filtered = ReportFilter::new(chosen, tiers).apply(extractor, &month_records);
    Ok(Some((bucket, filtered)))
}

async fn report(
    config: &DigestConfig,
    store: Arc<dyn RecordStore>,
    selection: &Selection,
    with_overview: bool,
    json: bool,
) -> Result<()> {
    let extractor = field_extractor(config);
    let Some((bucket, filtered)) = select(&extractor, &store, selection).await? else {
        println!("No summaries found. Run `news-digest run` first.");
        return Ok(());
    };

    let overview = if with_overview {
        let annotator =
            OpenAiAdapter::from_config(&config.annotator).context("annotator setup failed")?;
        let temperature = config.annotator.overview_temperature;
        match generate_overview(&annotator, &filtered, temperature).await {
            Ok(text) => Some(text),
            Err(e) => {
                warn!("Overview generation failed: {}", e);
                None
            }
        }
    } else {
        None
    };

    let report = Report {
        month: bucket.to_string(),
        summary: summarize(&extractor, &filtered),
        spotlight: spotlight(&extractor, &filtered, SPOTLIGHT_SIZE),
        overview: overview.as_deref(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("# {}\n", report.month);
    if let Some(text) = report.overview {
        println!("## What to know this month\n{}\n", text);
    }
    println!("Total summaries: {}", report.summary.total);
    println!("High relevance to Arm: {}", report.summary.high_relevance_count);
    println!("\nTop industry mentions:");
    for mention in &report.summary.top_mentions {
        println!("  - {} ({} mentions)", mention.token, mention.count);
    }
    println!("\nTop themes:");
    for theme in &report.summary.top_themes {
        println!("  - {} ({})", theme.token, theme.count);
    }
    println!("\nSpotlight:");
    if report.spotlight.is_empty() {
        println!("  No high relevance summaries this month.");
    }
    for item in &report.spotlight {
        println!("  * {} [{}]\n    {}\n    {}", item.title, item.category, item.link, item.excerpt);
    }
    Ok(())
}

async fn export(
    config: &DigestConfig,
    store: Arc<dyn RecordStore>,
    selection: &Selection,
    output: Option<PathBuf>,
) -> Result<()> {
    let extractor = field_extractor(config);
    let Some((bucket, filtered)) = select(&extractor, &store, selection).await? else {
        println!("No summaries found. Run `news-digest run` first.");
        return Ok(());
    };

    let path = output.unwrap_or_else(|| PathBuf::from(export_file_name(bucket)));
    let rows = export_rows(&filtered);
    std::fs::write(&path, export_csv(&rows))
        .with_context(|| format!("failed to write {}", path.display()))?;

    println!("Wrote {} rows to {}", rows.len(), path.display());
    Ok(())
}

async fn buckets(config: &DigestConfig, store: Arc<dyn RecordStore>) -> Result<()> {
    let records = store.load_all().await.context("failed to load records")?;
    let aggregator = TimeBucketAggregator::new(field_extractor(config));
    for bucket in aggregator.available_buckets(&records) {
        let count = aggregator.in_bucket(&records, bucket).len();
        println!("{} ({} records)", bucket, count);
    }
    Ok(())
}
