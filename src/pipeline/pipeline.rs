// src/pipeline/pipeline.rs

use crate::error::Result;
use crate::models::CrawlerConfig;
use crate::services::Jurisdiction;
use crate::storage::ProjectStore;

use super::crawl::{ListingOptions, run_listing_phase};
use super::sync::run_detail_phase;

/// How much of the listing to walk in one run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum ScrapeMode {
    /// First `daily_pages` pages; the incremental default
    Daily,
    /// Every configured listing page
    Full,
    /// Page 1 only, for smoke-testing a deployment
    Test,
}

impl std::fmt::Display for ScrapeMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            ScrapeMode::Daily => "daily",
            ScrapeMode::Full => "full",
            ScrapeMode::Test => "test",
        })
    }
}

/// Run the full pipeline: listing crawl, then detail sync.
///
/// The detail phase always runs regardless of mode - it works off
/// persisted staleness, not off whatever pages this run happened to walk.
pub async fn run_pipeline(
    jurisdiction: &Jurisdiction,
    store: &dyn ProjectStore,
    crawler: &CrawlerConfig,
    mode: ScrapeMode,
) -> Result<()> {
    log::info!(
        "[{}] Starting scraper in {mode} mode...",
        jurisdiction.display_name
    );

    let (end_page, full_crawl) = match mode {
        ScrapeMode::Daily => (jurisdiction.daily_pages, false),
        ScrapeMode::Full => (jurisdiction.total_pages, true),
        ScrapeMode::Test => (1, false),
    };

    let options = ListingOptions {
        start_page: 1,
        end_page,
        full_crawl,
        rate_limit: crawler.rate_limit(),
    };

    run_listing_phase(jurisdiction, &options).await?;
    run_detail_phase(jurisdiction, store, crawler.batch_size).await?;

    log::info!("[{}] Scraper run completed.", jurisdiction.display_name);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_display_matches_cli_values() {
        assert_eq!(ScrapeMode::Daily.to_string(), "daily");
        assert_eq!(ScrapeMode::Full.to_string(), "full");
        assert_eq!(ScrapeMode::Test.to_string(), "test");
    }
}
