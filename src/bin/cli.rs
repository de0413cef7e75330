//! RERA Crawler CLI
//!
//! Local execution entry point for the ingestion pipeline.

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rera_crawler::{
    error::{AppError, Result},
    models::Config,
    pipeline::{self, ListingOptions, ScrapeMode},
    services::Jurisdiction,
    storage::{LocalStore, ProjectStore},
};

/// RERA registry project scraper
#[derive(Parser, Debug)]
#[command(
    name = "rera-crawler",
    version,
    about = "Crawls state RERA registries for real-estate project filings"
)]
struct Cli {
    /// Path to the TOML configuration file
    #[arg(short, long, default_value = "config.toml")]
    config: PathBuf,

    /// Directory holding the crawled data files
    #[arg(short, long, default_value = "storage")]
    storage_dir: PathBuf,

    /// Jurisdiction to scrape
    #[arg(long, default_value = "maharashtra")]
    state: String,

    /// Bearer token for the detail API (falls back to RERA_TOKEN)
    #[arg(long)]
    token: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the full pipeline: listing crawl, then detail sync
    Run {
        /// How much of the listing to walk
        #[arg(long, value_enum, default_value_t = ScrapeMode::Daily)]
        mode: ScrapeMode,
    },

    /// Crawl an explicit listing page range, skipping the detail phase
    Listing {
        /// First page to fetch
        #[arg(long, default_value_t = 1)]
        start: u32,

        /// Last page to fetch (default: the jurisdiction's daily page count)
        #[arg(long)]
        end: Option<u32>,
    },

    /// Run only the detail synchronization phase
    Detail,

    /// Validate configuration files
    Validate,

    /// Show stored record counts
    Info,
}

/// Initialize logging based on verbosity flag.
fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp_secs()
        .init();
}

/// Main entry point for the CLI application.
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    log::info!("RERA Crawler starting...");

    let config = Config::load_or_default(&cli.config);

    if let Command::Validate = cli.command {
        log::info!("Validating configuration...");
        if let Err(e) = config.validate() {
            log::error!("Config validation failed: {e}");
            return Err(e);
        }
        log::info!("✓ Config OK ({} jurisdiction(s) defined)", config.jurisdictions.len());
        return Ok(());
    }

    let store = Arc::new(LocalStore::open(&cli.storage_dir).await?);

    if let Command::Info = cli.command {
        let (listings, projects, active_flags) = store.counts().await;
        log::info!("Storage directory: {}", cli.storage_dir.display());
        log::info!("Staging records: {listings}");
        log::info!("Canonical projects: {projects}");
        log::info!("Active red flags: {active_flags}");
        return Ok(());
    }

    let Some(jurisdiction_config) = config.jurisdiction(&cli.state) else {
        let available: Vec<&str> = config
            .jurisdictions
            .iter()
            .map(|j| j.name.as_str())
            .collect();
        log::error!(
            "Unknown state: {}. Available states: {}",
            cli.state,
            available.join(", ")
        );
        return Err(AppError::config(format!("Unknown state: {}", cli.state)));
    };

    let token = cli.token.or_else(|| std::env::var("RERA_TOKEN").ok());
    let store_dyn: Arc<dyn ProjectStore> = Arc::clone(&store) as Arc<dyn ProjectStore>;
    let jurisdiction =
        Jurisdiction::from_config(&config, jurisdiction_config, store_dyn, token)?;

    match cli.command {
        Command::Run { mode } => {
            pipeline::run_pipeline(&jurisdiction, store.as_ref(), &config.crawler, mode).await?;
        }

        Command::Listing { start, end } => {
            let options = ListingOptions {
                start_page: start,
                end_page: end.unwrap_or(jurisdiction.daily_pages),
                full_crawl: false,
                rate_limit: config.crawler.rate_limit(),
            };
            pipeline::run_listing_phase(&jurisdiction, &options).await?;
        }

        Command::Detail => {
            pipeline::run_detail_phase(&jurisdiction, store.as_ref(), config.crawler.batch_size)
                .await?;
        }

        Command::Validate | Command::Info => unreachable!("handled above"),
    }

    log::info!("Done!");

    Ok(())
}
