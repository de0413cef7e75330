// src/pipeline/crawl.rs

//! Listing crawl phase.
//!
//! Walks a page range strictly sequentially, persisting extracted records
//! and stopping early once the registry runs out of data. Sequential with
//! a jittered delay between pages: politeness toward the registry, not a
//! throughput concern.

use std::time::Duration;

use crate::error::Result;
use crate::services::Jurisdiction;

/// Consecutive empty pages treated as "end of available data".
pub const MAX_CONSECUTIVE_EMPTY_PAGES: u32 = 3;

/// Upper bound of the uniform random jitter added between pages.
const JITTER_MS: u64 = 500;

/// Page range and pacing for one listing crawl.
#[derive(Debug, Clone)]
pub struct ListingOptions {
    pub start_page: u32,
    pub end_page: u32,
    pub full_crawl: bool,
    pub rate_limit: Duration,
}

/// Crawl the configured page range.
///
/// An empty page increments a consecutive-empty counter; three in a row
/// end the crawl as exhausted data, not as an error. A page whose fetch
/// failed past retries also counts as empty. Non-empty pages reset the
/// counter.
pub async fn run_listing_phase(
    jurisdiction: &Jurisdiction,
    options: &ListingOptions,
) -> Result<()> {
    log::info!(
        "[{}] Starting {} crawl from page {} to {}",
        jurisdiction.display_name,
        if options.full_crawl { "FULL" } else { "INCREMENTAL" },
        options.start_page,
        options.end_page
    );

    let mut consecutive_empty_pages: u32 = 0;

    for page in options.start_page..=options.end_page {
        let projects = jurisdiction.listing.scrape_page(page).await?;

        if !projects.is_empty() {
            jurisdiction.listing.save_projects(&projects).await?;
            log::info!(
                "[{}] Scraped {} projects from page {page}",
                jurisdiction.display_name,
                projects.len()
            );
            consecutive_empty_pages = 0;
        } else {
            consecutive_empty_pages += 1;
            log::warn!(
                "[{}] No projects found on page {page} ({consecutive_empty_pages} consecutive empty pages)",
                jurisdiction.display_name
            );
            if consecutive_empty_pages >= MAX_CONSECUTIVE_EMPTY_PAGES {
                log::warn!(
                    "[{}] Stopping after {MAX_CONSECUTIVE_EMPTY_PAGES} consecutive empty pages",
                    jurisdiction.display_name
                );
                break;
            }
        }

        tokio::time::sleep(options.rate_limit + jitter()).await;
    }

    log::info!("[{}] Listing crawl completed.", jurisdiction.display_name);
    Ok(())
}

/// Uniform random delay in `[0, 500 ms)` so the request cadence never
/// looks machine-regular.
fn jitter() -> Duration {
    let mut buf = [0u8; 8];
    if getrandom::getrandom(&mut buf).is_err() {
        return Duration::ZERO;
    }
    Duration::from_millis(u64::from_le_bytes(buf) % JITTER_MS)
}
