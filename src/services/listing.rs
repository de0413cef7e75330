// src/services/listing.rs

//! Listing-page scraper service.
//!
//! Extraction itself is a pure function over the page markup; the scraper
//! wraps it with the fetch, retry and persistence plumbing.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::header::{ACCEPT, ACCEPT_LANGUAGE};
use scraper::{ElementRef, Html};
use url::Url;

use crate::error::{AppError, Result};
use crate::models::{JurisdictionConfig, ListingProject};
use crate::services::selectors::{self, ListingSelectors};
use crate::services::ListingScraper;
use crate::storage::ProjectStore;
use crate::utils::parse::parse_listing_date;
use crate::utils::{RetryOptions, with_retry};

const ACCEPT_HTML: &str =
    "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8";

/// Extract all project records from one listing page.
///
/// Tolerant by design: a malformed card is dropped with a diagnostic and
/// never aborts extraction of the remaining cards. Feeding the same markup
/// twice yields the same records.
pub fn parse_listing_html(html: &str) -> Vec<ListingProject> {
    let document = Html::parse_document(html);
    let sel = selectors::listing();

    document
        .select(&sel.card)
        .filter_map(|card| parse_card(&card, sel))
        .collect()
}

fn parse_card(card: &ElementRef, sel: &ListingSelectors) -> Option<ListingProject> {
    let rera_id = card
        .select(&sel.rera_id)
        .next()
        .map(|el| collect_text(&el))
        .unwrap_or_default()
        .trim_start_matches('#')
        .trim()
        .to_string();

    let project_name = card
        .select(&sel.name)
        .next()
        .map(|el| collect_text(&el))
        .unwrap_or_default();

    // Registration number and name are the only required fields.
    if rera_id.is_empty() || project_name.is_empty() {
        log::warn!(
            "Dropping malformed listing card (rera_id: {rera_id:?}, name: {project_name:?})"
        );
        return None;
    }

    let developer = card
        .select(&sel.developer)
        .next()
        .map(|el| collect_text(&el))
        .filter(|text| !text.is_empty());

    let location_taluka = card
        .select(&sel.location)
        .next()
        .map(|el| normalize_whitespace(&collect_text(&el)))
        .filter(|text| !text.is_empty());

    let district = labeled_field(card, sel, "District");
    let pincode = labeled_field(card, sel, "Pincode");
    let last_modified =
        labeled_field(card, sel, "Last Modified").and_then(|raw| parse_listing_date(&raw));

    let internal_id = card
        .select(&sel.detail_link)
        .next()
        .and_then(|a| a.value().attr("href"))
        .and_then(|href| href.rsplit('/').next())
        .and_then(|segment| segment.parse::<i64>().ok());

    let has_extension_cert = card.select(&sel.ext_cert_flag).next().is_some()
        || card.select(&sel.ext_cert_title).next().is_some();

    Some(ListingProject {
        rera_id,
        project_name,
        developer,
        location_taluka,
        district,
        pincode,
        last_modified,
        internal_id,
        has_extension_cert,
        detail_synced_at: None,
    })
}

/// Value of the labeled field whose caption contains `caption`, or `None`
/// if no such label exists on the card.
fn labeled_field(card: &ElementRef, sel: &ListingSelectors, caption: &str) -> Option<String> {
    for label in card.select(&sel.field_label) {
        let text: String = label.text().collect();
        if !text.contains(caption) {
            continue;
        }
        let parent = label.parent().and_then(ElementRef::wrap)?;
        return parent
            .select(&sel.field_value)
            .next()
            .map(|value| collect_text(&value));
    }
    None
}

fn collect_text(element: &ElementRef) -> String {
    element.text().collect::<String>().trim().to_string()
}

fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Listing scraper for the MahaRERA public search pages.
pub struct MahaListingScraper {
    client: reqwest::Client,
    listing_base_url: String,
    project_state: u32,
    store: Arc<dyn ProjectStore>,
    retry: RetryOptions,
}

impl MahaListingScraper {
    pub fn new(
        client: reqwest::Client,
        jurisdiction: &JurisdictionConfig,
        store: Arc<dyn ProjectStore>,
        retry: RetryOptions,
    ) -> Self {
        Self {
            client,
            listing_base_url: jurisdiction.listing_base_url.clone(),
            project_state: jurisdiction.project_state,
            store,
            retry,
        }
    }

    fn page_url(&self, page: u32) -> Result<Url> {
        let mut url = Url::parse(&self.listing_base_url)?;
        url.query_pairs_mut()
            .append_pair("project_state", &self.project_state.to_string())
            .append_pair("page", &page.to_string())
            .append_pair("op", "");
        Ok(url)
    }

    async fn fetch_page(&self, url: Url) -> Result<String> {
        let response = self
            .client
            .get(url.clone())
            .header(ACCEPT, ACCEPT_HTML)
            .header(ACCEPT_LANGUAGE, "en-US,en;q=0.9")
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::status(status, url.as_str()));
        }
        Ok(response.text().await?)
    }
}

#[async_trait]
impl ListingScraper for MahaListingScraper {
    async fn scrape_page(&self, page: u32) -> Result<Vec<ListingProject>> {
        log::info!("Scraping page {page}...");
        let url = self.page_url(page)?;

        let html = match with_retry(&self.retry, || self.fetch_page(url.clone())).await {
            Ok(html) => html,
            Err(error) => {
                // Exhausted retries degrade to an empty page; the crawl
                // loop's stopping heuristic decides what that means.
                log::error!("Error scraping page {page}: {error}");
                return Ok(Vec::new());
            }
        };

        Ok(parse_listing_html(&html))
    }

    async fn save_projects(&self, projects: &[ListingProject]) -> Result<()> {
        for project in projects {
            if let Err(error) = self.store.upsert_listing(project).await {
                log::error!("Error saving project {}: {error}", project.rera_id);
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    const SAMPLE_CARD: &str = r#"
    <div class="shadow p-3 mb-5 bg-body rounded">
      <div class="col-xl-4">
        <p class="p-0"># P52100000001</p>
      </div>
      <h4 class="title4"><strong>Sample Project Name</strong></h4>
      <p class="darkBlue bold">Sample Developer Ltd.</p>
      <div class="col-xl-4">
        <div class="listingList">
          <li><a>Andheri,   Mumbai Suburban</a></li>
        </div>
      </div>
      <div>
        <div class="greyColor">Pincode:</div>
        <p>400053</p>
      </div>
      <div>
        <div class="greyColor">District:</div>
        <p>Mumbai Suburban</p>
      </div>
      <div>
        <div class="greyColor">Last Modified:</div>
        <p>2024-01-15</p>
      </div>
      <a class="click-projectmodal" href="/project/12345"></a>
      <a data-qstr-flag="DocProjectExtCert"></a>
    </div>
    "#;

    const MINIMAL_CARD: &str = r#"
    <div class="shadow p-3 mb-5 bg-body rounded">
      <div class="col-xl-4">
        <p class="p-0"># P52100000002</p>
      </div>
      <h4 class="title4"><strong>Minimal Project</strong></h4>
    </div>
    "#;

    #[test]
    fn extracts_all_fields() {
        let projects = parse_listing_html(SAMPLE_CARD);
        assert_eq!(projects.len(), 1);

        let project = &projects[0];
        assert_eq!(project.rera_id, "P52100000001");
        assert_eq!(project.project_name, "Sample Project Name");
        assert_eq!(project.developer.as_deref(), Some("Sample Developer Ltd."));
        assert_eq!(
            project.location_taluka.as_deref(),
            Some("Andheri, Mumbai Suburban")
        );
        assert_eq!(project.district.as_deref(), Some("Mumbai Suburban"));
        assert_eq!(project.pincode.as_deref(), Some("400053"));
        assert_eq!(project.last_modified, NaiveDate::from_ymd_opt(2024, 1, 15));
        assert_eq!(project.internal_id, Some(12345));
        assert!(project.has_extension_cert);
    }

    #[test]
    fn handles_missing_optional_fields() {
        let projects = parse_listing_html(MINIMAL_CARD);
        assert_eq!(projects.len(), 1);

        let project = &projects[0];
        assert_eq!(project.rera_id, "P52100000002");
        assert_eq!(project.project_name, "Minimal Project");
        assert_eq!(project.developer, None);
        assert_eq!(project.location_taluka, None);
        assert_eq!(project.district, None);
        assert_eq!(project.pincode, None);
        assert_eq!(project.last_modified, None);
        assert_eq!(project.internal_id, None);
        assert!(!project.has_extension_cert);
    }

    #[test]
    fn extraction_is_idempotent() {
        let page = format!("{SAMPLE_CARD}{MINIMAL_CARD}");
        let first = parse_listing_html(&page);
        let second = parse_listing_html(&page);
        assert_eq!(first, second);
        assert_eq!(first.len(), 2);
    }

    #[test]
    fn malformed_card_does_not_abort_the_page() {
        let broken = r#"
        <div class="shadow p-3 mb-5 bg-body rounded">
          <h4 class="title4"><strong>No Registration Number</strong></h4>
        </div>
        "#;
        let page = format!("{broken}{MINIMAL_CARD}");
        let projects = parse_listing_html(&page);
        assert_eq!(projects.len(), 1);
        assert_eq!(projects[0].rera_id, "P52100000002");
    }

    #[test]
    fn last_modified_day_month_year_fallback() {
        let card = r#"
        <div class="shadow p-3 mb-5 bg-body rounded">
          <div class="col-xl-4"><p class="p-0"># P52100000003</p></div>
          <h4 class="title4"><strong>Fallback Date Project</strong></h4>
          <div>
            <div class="greyColor">Last Modified:</div>
            <p>15-01-2024</p>
          </div>
        </div>
        "#;
        let projects = parse_listing_html(card);
        assert_eq!(
            projects[0].last_modified,
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn non_numeric_detail_link_yields_no_internal_id() {
        let card = SAMPLE_CARD.replace("/project/12345", "/project/view");
        let projects = parse_listing_html(&card);
        assert_eq!(projects[0].internal_id, None);
    }

    #[test]
    fn invalid_last_modified_is_discarded() {
        let card = SAMPLE_CARD.replace("2024-01-15", "coming soon");
        let projects = parse_listing_html(&card);
        assert_eq!(projects[0].last_modified, None);
    }
}
