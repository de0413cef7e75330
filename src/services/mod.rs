// src/services/mod.rs

//! Jurisdiction scraper services.
//!
//! A jurisdiction is a capability pair: a listing scraper over the public
//! search pages and a detail scraper over the authenticated API. The
//! pipeline only ever talks to the traits, so tests (and future states)
//! swap implementations freely.

pub mod detail;
pub mod listing;
pub mod selectors;

use std::sync::Arc;

use async_trait::async_trait;

pub use detail::{MahaDetailScraper, map_project};
pub use listing::{MahaListingScraper, parse_listing_html};

use crate::error::Result;
use crate::models::{Config, JurisdictionConfig, ListingProject};
use crate::storage::ProjectStore;
use crate::utils::{RetryOptions, http};

/// Crawls the paginated public listing.
#[async_trait]
pub trait ListingScraper: Send + Sync {
    /// Fetch and extract one listing page.
    ///
    /// A fetch failure that survives retries degrades to an empty record
    /// set; it is not an error at this boundary.
    async fn scrape_page(&self, page: u32) -> Result<Vec<ListingProject>>;

    /// Persist extracted records, continuing past per-record failures.
    async fn save_projects(&self, projects: &[ListingProject]) -> Result<()>;
}

/// Fetches and persists full detail for one project.
#[async_trait]
pub trait DetailScraper: Send + Sync {
    async fn process_project(&self, internal_id: i64) -> Result<()>;
}

/// One configured state registry with its scraper pair.
pub struct Jurisdiction {
    pub name: String,
    pub display_name: String,
    pub listing: Box<dyn ListingScraper>,
    pub detail: Box<dyn DetailScraper>,
    pub total_pages: u32,
    pub daily_pages: u32,
}

impl Jurisdiction {
    /// Build the concrete scraper pair for a configured registry.
    ///
    /// `fallback_token` is the operator-supplied bearer credential used
    /// when the token cache has nothing usable.
    pub fn from_config(
        config: &Config,
        jurisdiction: &JurisdictionConfig,
        store: Arc<dyn ProjectStore>,
        fallback_token: Option<String>,
    ) -> Result<Self> {
        let client = http::create_client(&config.crawler)?;
        let retry = RetryOptions::from_config(&config.retry);

        Ok(Self {
            name: jurisdiction.name.clone(),
            display_name: jurisdiction.display_name.clone(),
            listing: Box::new(MahaListingScraper::new(
                client.clone(),
                jurisdiction,
                Arc::clone(&store),
                retry,
            )),
            detail: Box::new(MahaDetailScraper::new(
                client,
                jurisdiction,
                store,
                retry,
                fallback_token,
            )),
            total_pages: jurisdiction.total_pages,
            daily_pages: jurisdiction.daily_pages,
        })
    }
}
