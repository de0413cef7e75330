//! Application configuration structures.

use std::fs;
use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{AppError, Result};

/// Root application configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// HTTP and crawling behavior settings
    #[serde(default)]
    pub crawler: CrawlerConfig,

    /// Retry/backoff settings for outbound requests
    #[serde(default)]
    pub retry: RetryConfig,

    /// Registry definitions, one per jurisdiction
    #[serde(default = "defaults::default_jurisdictions")]
    pub jurisdictions: Vec<JurisdictionConfig>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Load configuration or return default if loading fails.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        Self::load(&path).unwrap_or_else(|e| {
            log::warn!(
                "Config load failed from {:?}: {}. Using defaults.",
                path.as_ref(),
                e
            );
            Self::default()
        })
    }

    /// Validate configuration values for basic sanity.
    pub fn validate(&self) -> Result<()> {
        if self.crawler.user_agent.trim().is_empty() {
            return Err(AppError::validation("crawler.user_agent is empty"));
        }
        if self.crawler.timeout_secs == 0 {
            return Err(AppError::validation("crawler.timeout_secs must be > 0"));
        }
        if self.crawler.batch_size == 0 {
            return Err(AppError::validation("crawler.batch_size must be > 0"));
        }
        if self.retry.backoff_ms == 0 {
            return Err(AppError::validation("retry.backoff_ms must be > 0"));
        }
        if self.jurisdictions.is_empty() {
            return Err(AppError::validation("No jurisdictions defined"));
        }
        for jurisdiction in &self.jurisdictions {
            jurisdiction.validate()?;
        }
        Ok(())
    }

    /// Find a jurisdiction definition by name.
    pub fn jurisdiction(&self, name: &str) -> Option<&JurisdictionConfig> {
        self.jurisdictions.iter().find(|j| j.name == name)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            crawler: CrawlerConfig::default(),
            retry: RetryConfig::default(),
            jurisdictions: defaults::default_jurisdictions(),
        }
    }
}

/// HTTP client and crawling behavior settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrawlerConfig {
    /// User-Agent header for HTTP requests
    #[serde(default = "defaults::user_agent")]
    pub user_agent: String,

    /// Request timeout in seconds
    #[serde(default = "defaults::timeout")]
    pub timeout_secs: u64,

    /// Base delay between listing pages in milliseconds
    #[serde(default = "defaults::rate_limit")]
    pub rate_limit_ms: u64,

    /// Staging records fetched per detail-sync batch
    #[serde(default = "defaults::batch_size")]
    pub batch_size: usize,
}

impl CrawlerConfig {
    /// Base inter-page delay as a `Duration`.
    pub fn rate_limit(&self) -> Duration {
        Duration::from_millis(self.rate_limit_ms)
    }
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            user_agent: defaults::user_agent(),
            timeout_secs: defaults::timeout(),
            rate_limit_ms: defaults::rate_limit(),
            batch_size: defaults::batch_size(),
        }
    }
}

/// Retry/backoff settings for outbound requests.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Retries after the first attempt; an operation runs at most
    /// `max_retries + 1` times
    #[serde(default = "defaults::max_retries")]
    pub max_retries: u32,

    /// Base backoff in milliseconds, doubled on each attempt
    #[serde(default = "defaults::backoff")]
    pub backoff_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_retries: defaults::max_retries(),
            backoff_ms: defaults::backoff(),
        }
    }
}

/// One state registry: endpoints and page-count limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JurisdictionConfig {
    /// Short identifier, e.g. "maharashtra"
    pub name: String,

    /// Human-readable name used in log prefixes
    pub display_name: String,

    /// Search-result listing page, paginated via query string
    pub listing_base_url: String,

    /// `project_state` query parameter value for this state
    pub project_state: u32,

    /// Base URL of the authenticated project-registration API
    pub detail_api_url: String,

    /// Total listing pages a full crawl walks
    pub total_pages: u32,

    /// Listing pages an incremental (daily) crawl walks
    pub daily_pages: u32,
}

impl JurisdictionConfig {
    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(AppError::validation("jurisdiction.name is empty"));
        }
        if self.listing_base_url.trim().is_empty() || self.detail_api_url.trim().is_empty() {
            return Err(AppError::validation(format!(
                "jurisdiction '{}' is missing registry URLs",
                self.name
            )));
        }
        if self.total_pages == 0 || self.daily_pages == 0 {
            return Err(AppError::validation(format!(
                "jurisdiction '{}' page counts must be > 0",
                self.name
            )));
        }
        Ok(())
    }
}

mod defaults {
    use super::JurisdictionConfig;

    // Crawler defaults
    pub fn user_agent() -> String {
        "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 \
         (KHTML, like Gecko) Chrome/121.0.0.0 Safari/537.36"
            .into()
    }
    pub fn timeout() -> u64 {
        30
    }
    pub fn rate_limit() -> u64 {
        1000
    }
    pub fn batch_size() -> usize {
        50
    }

    // Retry defaults
    pub fn max_retries() -> u32 {
        3
    }
    pub fn backoff() -> u64 {
        1000
    }

    // Jurisdiction defaults
    pub fn default_jurisdictions() -> Vec<JurisdictionConfig> {
        vec![JurisdictionConfig {
            name: "maharashtra".to_string(),
            display_name: "Maharashtra".to_string(),
            listing_base_url: "https://maharera.maharashtra.gov.in/projects-search-result"
                .to_string(),
            project_state: 27,
            detail_api_url: "https://maharerait.maharashtra.gov.in/api/\
                             maha-rera-public-view-project-registration-service/\
                             public/projectregistartion/"
                .to_string(),
            total_pages: 4655,
            daily_pages: 50,
        }]
    }
}
